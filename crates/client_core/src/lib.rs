//! Client-side state for the product manager: a local mirror of the remote
//! product collection plus the selection, view, form, and notification state
//! a product list screen needs.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod notification;
pub mod selection;
pub mod store;
pub mod view;

pub use api::{HttpProductsApi, ProductsApi};
pub use config::ClientSettings;
pub use controller::{Controller, SubmitOutcome};
pub use error::{FormError, MutationOp, StoreError};
pub use form::{FormSubmission, ProductForm};
pub use notification::{Notification, NotificationCenter};
pub use selection::SelectionManager;
pub use store::{BulkDeleteOutcome, BulkDeletePolicy, CollectionStore};
pub use view::{Pagination, SortConfig, SortDirection, SortKey, SortScope, ViewRows};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
