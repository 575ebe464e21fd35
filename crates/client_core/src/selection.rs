use std::collections::HashSet;

use shared::domain::{Product, ProductId};

/// Checkbox selection plus the most recently selected product, which seeds
/// the edit form.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    selected: HashSet<ProductId>,
    last_touched: Option<Product>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, product: &Product) {
        if self.selected.remove(&product.id) {
            if self.last_touched_id() == Some(product.id) {
                self.last_touched = None;
            }
        } else {
            self.selected.insert(product.id);
            self.last_touched = Some(product.clone());
        }
    }

    /// Select-all over every row matching the active filter, not just the
    /// current page. Clears when that exact set is already selected.
    pub fn toggle_all(&mut self, filtered_ids: &[ProductId]) {
        if self.all_selected(filtered_ids) {
            self.selected.clear();
        } else {
            self.selected = filtered_ids.iter().copied().collect();
        }
    }

    pub fn all_selected(&self, filtered_ids: &[ProductId]) -> bool {
        let filtered: HashSet<ProductId> = filtered_ids.iter().copied().collect();
        self.selected == filtered
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.last_touched = None;
    }

    pub fn clear_last_touched(&mut self) {
        self.last_touched = None;
    }

    /// Drops ids that left the collection.
    pub fn drop_ids(&mut self, ids: &[ProductId]) {
        for id in ids {
            self.selected.remove(id);
        }
        if self
            .last_touched_id()
            .is_some_and(|id| ids.contains(&id))
        {
            self.last_touched = None;
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(ProductId) -> bool) {
        self.selected.retain(|id| keep(*id));
        if self.last_touched_id().is_some_and(|id| !keep(id)) {
            self.last_touched = None;
        }
    }

    pub fn is_selected(&self, id: ProductId) -> bool {
        self.selected.contains(&id)
    }

    /// Selected ids in ascending order.
    pub fn selected_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self.selected.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn last_touched(&self) -> Option<&Product> {
        self.last_touched.as_ref()
    }

    fn last_touched_id(&self) -> Option<ProductId> {
        self.last_touched.as_ref().map(|product| product.id)
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
