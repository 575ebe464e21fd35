use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    Add,
    Update,
}

impl fmt::Display for MutationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MutationOp::Add => "add",
            MutationOp::Update => "update",
        })
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to fetch products: {0}")]
    FetchFailed(#[source] anyhow::Error),
    #[error("failed to {op} product: {source}")]
    MutationFailed {
        op: MutationOp,
        #[source]
        source: anyhow::Error,
    },
}

impl StoreError {
    pub fn mutation(op: MutationOp, source: anyhow::Error) -> Self {
        Self::MutationFailed { op, source }
    }

    pub fn op(&self) -> Option<MutationOp> {
        match self {
            StoreError::FetchFailed(_) => None,
            StoreError::MutationFailed { op, .. } => Some(*op),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Product name cannot be empty")]
    EmptyName,
}
