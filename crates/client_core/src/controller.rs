use std::sync::Arc;

use anyhow::Result;
use shared::domain::{Product, ProductId};
use tracing::{info, warn};

use crate::{
    api::{HttpProductsApi, ProductsApi},
    config::ClientSettings,
    error::{FormError, StoreError},
    form::{FormSubmission, ProductForm},
    notification::NotificationCenter,
    selection::SelectionManager,
    store::{BulkDeleteOutcome, CollectionStore},
    view::{self, Pagination, SortConfig, SortKey, SortScope, ViewRows},
};

pub const MSG_PRODUCT_ADDED: &str = "Product added successfully";
pub const MSG_ADD_FAILED: &str = "Error adding product";
pub const MSG_UPDATE_FAILED: &str = "Error updating product";
pub const MSG_ITEMS_DELETED: &str = "Selected items deleted successfully";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(Product),
    /// `None` when the server accepted the update but no local entry changed.
    Updated(Option<Product>),
    /// The remote rejected the mutation; a notification has been raised and
    /// the form keeps its contents.
    Failed,
}

/// Session state for one product list screen.
///
/// Owns the collection store together with all UI state (selection, filter,
/// sort, page, form, notification) and routes user intents to them.
pub struct Controller {
    store: CollectionStore,
    selection: SelectionManager,
    notifications: NotificationCenter,
    form: ProductForm,
    filter: String,
    sort: SortConfig,
    pagination: Pagination,
    sort_scope: SortScope,
}

impl Controller {
    pub fn new(api: Arc<dyn ProductsApi>) -> Self {
        Self::with_settings(api, &ClientSettings::default())
    }

    pub fn with_settings(api: Arc<dyn ProductsApi>, settings: &ClientSettings) -> Self {
        Self {
            store: CollectionStore::new(api).with_delete_policy(settings.bulk_delete_policy),
            selection: SelectionManager::new(),
            notifications: NotificationCenter::new(settings.notification_ttl),
            form: ProductForm::new(),
            filter: String::new(),
            sort: SortConfig::default(),
            pagination: Pagination::new(settings.page_size),
            sort_scope: settings.sort_scope,
        }
    }

    /// Builds a controller talking to the HTTP backend named in `settings`.
    pub fn connect(settings: &ClientSettings) -> Result<Self> {
        let api = HttpProductsApi::with_timeout(&settings.server_url, settings.request_timeout)?;
        Ok(Self::with_settings(Arc::new(api), settings))
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn form(&self) -> &ProductForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ProductForm {
        &mut self.form
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn sort_config(&self) -> SortConfig {
        self.sort
    }

    pub fn current_page(&self) -> usize {
        self.pagination.current_page()
    }

    pub fn notification(&self) -> Option<String> {
        self.notifications.current()
    }

    pub fn dismiss_notification(&mut self) {
        self.notifications.dismiss();
    }

    pub fn view(&self) -> ViewRows {
        self.store.with_products(|products| {
            view::visible_rows(
                products,
                &self.filter,
                self.sort,
                &self.pagination,
                self.sort_scope,
            )
        })
    }

    fn filtered_ids(&self) -> Vec<ProductId> {
        self.store.with_products(|products| {
            view::filter(products, &self.filter)
                .into_iter()
                .map(|product| product.id)
                .collect()
        })
    }

    fn reclamp_page(&mut self) {
        let count = self
            .store
            .with_products(|products| view::filter(products, &self.filter).len());
        self.pagination.clamp(count);
    }

    /// Re-seeds the form when the last-touched product changed.
    fn sync_form(&mut self, previous: Option<ProductId>) {
        let current = self.selection.last_touched().map(|product| product.id);
        if current != previous {
            self.form.prefill(self.selection.last_touched());
        }
    }

    fn last_touched_id(&self) -> Option<ProductId> {
        self.selection.last_touched().map(|product| product.id)
    }

    /// Full refresh from the remote. Failures keep the stale collection and
    /// are only logged.
    pub async fn refresh(&mut self) -> Result<usize, StoreError> {
        let count = self.store.load().await.inspect_err(|error| {
            warn!(%error, "product refresh failed; keeping current collection");
        })?;

        let previous = self.last_touched_id();
        let store = self.store.clone();
        self.selection.retain(|id| store.contains(id));
        self.sync_form(previous);
        self.reclamp_page();
        Ok(count)
    }

    /// Callers pass a non-empty name; the form enforces this for UI input.
    pub async fn add(&mut self, name: &str) -> Result<Product, StoreError> {
        let result = self.store.create(name).await;
        match &result {
            Ok(_) => self.notifications.notify(MSG_PRODUCT_ADDED),
            Err(_) => self.notifications.notify(MSG_ADD_FAILED),
        }
        self.reclamp_page();
        result
    }

    pub async fn edit(&mut self, product: Product) -> Result<Option<Product>, StoreError> {
        let result = self.store.update(product).await;
        if result.is_err() {
            self.notifications.notify(MSG_UPDATE_FAILED);
        }
        self.reclamp_page();
        result
    }

    /// Submits the form as an update of the last-touched product, or as a
    /// create when nothing is being edited. The form is reset and edit mode
    /// left only when the server accepted the change.
    pub async fn submit_form(&mut self) -> Result<SubmitOutcome, FormError> {
        let selected = self.last_touched_id();
        let submission = self.form.submit(selected)?;
        let outcome = match submission {
            FormSubmission::Create { name } => match self.add(&name).await {
                Ok(created) => SubmitOutcome::Created(created),
                Err(_) => SubmitOutcome::Failed,
            },
            FormSubmission::Update(product) => match self.edit(product).await {
                Ok(updated) => SubmitOutcome::Updated(updated),
                Err(_) => SubmitOutcome::Failed,
            },
        };

        if outcome != SubmitOutcome::Failed {
            self.form.reset();
            self.selection.clear_last_touched();
        }
        Ok(outcome)
    }

    /// Deletes every selected product. Does nothing when the selection is
    /// empty.
    pub async fn delete_selected(&mut self) -> Option<BulkDeleteOutcome> {
        let ids = self.selection.selected_ids();
        let outcome = self.store.delete_many(&ids).await?;

        let previous = self.last_touched_id();
        if outcome.has_failures() {
            self.selection.drop_ids(&outcome.removed);
            self.notifications.notify(format!(
                "Failed to delete {} item(s)",
                outcome.failed.len()
            ));
        } else {
            self.selection.clear();
            self.notifications.notify(MSG_ITEMS_DELETED);
        }
        self.sync_form(previous);
        self.reclamp_page();
        info!(
            removed = outcome.removed.len(),
            failed = outcome.failed.len(),
            "selected products deleted"
        );
        Some(outcome)
    }

    pub fn toggle_select(&mut self, product: &Product) {
        let previous = self.last_touched_id();
        self.selection.toggle(product);
        self.sync_form(previous);
    }

    /// Toggles a product by id. Returns `false` when the id is not in the
    /// collection.
    pub fn toggle_select_id(&mut self, id: ProductId) -> bool {
        match self.store.get(id) {
            Some(product) => {
                self.toggle_select(&product);
                true
            }
            None => false,
        }
    }

    /// Adds every known id to the selection without toggling, so repeated
    /// ids stay selected. Returns the ids missing from the collection.
    pub fn select_ids(&mut self, ids: &[ProductId]) -> Vec<ProductId> {
        let mut unknown = Vec::new();
        for &id in ids {
            if self.selection.is_selected(id) {
                continue;
            }
            if !self.toggle_select_id(id) && !unknown.contains(&id) {
                unknown.push(id);
            }
        }
        unknown
    }

    pub fn toggle_select_all(&mut self) {
        let filtered = self.filtered_ids();
        self.selection.toggle_all(&filtered);
    }

    /// Header checkbox state.
    pub fn all_selected(&self) -> bool {
        self.selection.all_selected(&self.filtered_ids())
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.reclamp_page();
    }

    pub fn request_sort(&mut self, key: SortKey) {
        self.sort = self.sort.request(key);
    }

    pub fn set_sort(&mut self, sort: SortConfig) {
        self.sort = sort;
    }

    pub fn next_page(&mut self) {
        let count = self.filtered_ids().len();
        self.pagination.next(count);
    }

    pub fn prev_page(&mut self) {
        self.pagination.prev();
    }

    pub fn set_page(&mut self, page: usize) {
        let count = self.filtered_ids().len();
        self.pagination.set_page(page, count);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
