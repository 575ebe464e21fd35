use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::Utc;
use futures::future::join_all;
use shared::domain::{Product, ProductId};
use tracing::{debug, info, warn};

use crate::{
    api::ProductsApi,
    error::{MutationOp, StoreError},
};

/// What a bulk delete does with ids whose request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkDeletePolicy {
    /// Remove every targeted id once all requests have settled.
    #[default]
    Lenient,
    /// Remove only ids the server confirmed; failed ids stay.
    Strict,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteOutcome {
    pub removed: Vec<ProductId>,
    pub failed: Vec<ProductId>,
}

impl BulkDeleteOutcome {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

#[derive(Default)]
struct StoreState {
    products: Vec<Product>,
    /// Ticket of the last response applied to each entry.
    versions: HashMap<ProductId, u64>,
    next_ticket: u64,
}

impl StoreState {
    fn ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn position(&self, id: ProductId) -> Option<usize> {
        self.products.iter().position(|product| product.id == id)
    }
}

/// Local mirror of the remote product collection.
///
/// Every mutation is sent to the remote first and applied locally only once
/// the response arrives. The internal lock is never held across an `.await`,
/// so clones of the same store may have operations in flight at once; each
/// dispatch takes a ticket and an update response older than what an entry
/// already holds is dropped.
#[derive(Clone)]
pub struct CollectionStore {
    api: Arc<dyn ProductsApi>,
    state: Arc<Mutex<StoreState>>,
    delete_policy: BulkDeletePolicy,
}

impl CollectionStore {
    pub fn new(api: Arc<dyn ProductsApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(StoreState::default())),
            delete_policy: BulkDeletePolicy::default(),
        }
    }

    pub fn with_delete_policy(mut self, policy: BulkDeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn products(&self) -> Vec<Product> {
        self.state().products.clone()
    }

    pub fn with_products<R>(&self, f: impl FnOnce(&[Product]) -> R) -> R {
        f(&self.state().products)
    }

    pub fn get(&self, id: ProductId) -> Option<Product> {
        let state = self.state();
        state.position(id).map(|idx| state.products[idx].clone())
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.state().position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.state().products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().products.is_empty()
    }

    /// Replaces the local collection with the remote snapshot. On failure the
    /// previous collection is kept.
    pub async fn load(&self) -> Result<usize, StoreError> {
        let ticket = self.state().ticket();
        let products = self
            .api
            .list_products()
            .await
            .map_err(StoreError::FetchFailed)?;

        let mut state = self.state();
        state.versions = products.iter().map(|p| (p.id, ticket)).collect();
        state.products = dedupe_by_id(products);
        info!(count = state.products.len(), "product collection loaded");
        Ok(state.products.len())
    }

    /// Creates a product under a locally generated placeholder id and appends
    /// whatever the server returns. Callers must pass a non-empty name.
    pub async fn create(&self, name: &str) -> Result<Product, StoreError> {
        let candidate = Product::new(local_product_id(), name);
        let ticket = self.state().ticket();
        let created = self
            .api
            .create_product(&candidate)
            .await
            .map_err(|error| {
                warn!(%error, product_name = name, "product create failed");
                StoreError::mutation(MutationOp::Add, error)
            })?;

        let mut state = self.state();
        match state.position(created.id) {
            // The server reused an id we already hold; keep ids unique.
            Some(idx) => state.products[idx] = created.clone(),
            None => state.products.push(created.clone()),
        }
        state.versions.insert(created.id, ticket);
        info!(
            product_id = created.id.0,
            placeholder_id = candidate.id.0,
            "product created"
        );
        Ok(created)
    }

    /// Sends an update and replaces the matching local entry. Returns `None`
    /// when no entry with that id exists or when a newer response already
    /// landed; an update never inserts.
    pub async fn update(&self, product: Product) -> Result<Option<Product>, StoreError> {
        let ticket = self.state().ticket();
        let updated = self
            .api
            .update_product(&product)
            .await
            .map_err(|error| {
                warn!(%error, product_id = product.id.0, "product update failed");
                StoreError::mutation(MutationOp::Update, error)
            })?;

        let mut state = self.state();
        let Some(idx) = state.position(updated.id) else {
            debug!(product_id = updated.id.0, "update response for unknown product ignored");
            return Ok(None);
        };
        let applied = state.versions.get(&updated.id).copied().unwrap_or_default();
        if applied > ticket {
            debug!(
                product_id = updated.id.0,
                ticket, applied, "stale update response dropped"
            );
            return Ok(None);
        }
        state.products[idx] = updated.clone();
        state.versions.insert(updated.id, ticket);
        info!(product_id = updated.id.0, "product updated");
        Ok(Some(updated))
    }

    /// Issues one delete per id concurrently and applies the local removal
    /// only after every request has settled. An empty id list sends nothing
    /// and returns `None`.
    pub async fn delete_many(&self, ids: &[ProductId]) -> Option<BulkDeleteOutcome> {
        if ids.is_empty() {
            return None;
        }

        let results = join_all(ids.iter().map(|id| self.api.delete_product(*id))).await;

        let mut outcome = BulkDeleteOutcome::default();
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(()) => outcome.removed.push(*id),
                Err(error) => {
                    warn!(%error, product_id = id.0, "product delete failed");
                    match self.delete_policy {
                        BulkDeletePolicy::Lenient => outcome.removed.push(*id),
                        BulkDeletePolicy::Strict => outcome.failed.push(*id),
                    }
                }
            }
        }

        let removed: HashSet<ProductId> = outcome.removed.iter().copied().collect();
        let mut state = self.state();
        state.products.retain(|product| !removed.contains(&product.id));
        state.versions.retain(|id, _| !removed.contains(id));
        info!(
            removed = outcome.removed.len(),
            failed = outcome.failed.len(),
            "bulk delete settled"
        );
        Some(outcome)
    }
}

fn local_product_id() -> ProductId {
    ProductId(Utc::now().timestamp_millis())
}

fn dedupe_by_id(products: Vec<Product>) -> Vec<Product> {
    let mut seen = HashSet::new();
    products
        .into_iter()
        .filter(|product| seen.insert(product.id))
        .collect()
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
