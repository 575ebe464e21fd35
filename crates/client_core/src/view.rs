//! Pure derivation of the visible rows: filter, paginate, sort.
//!
//! Nothing here is cached; callers recompute the view from the current
//! collection and UI state on every change.

use std::cmp::Ordering;

use shared::domain::{Product, ProductId};

pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: SortKey::Id,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortConfig {
    /// Column-header click: the active key flips ascending to descending,
    /// anything else starts ascending.
    pub fn request(self, key: SortKey) -> Self {
        let direction = if self.key == key && self.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        Self { key, direction }
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let ordering = match self.key {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Name => a.name.cmp(&b.name),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Which rows the sort applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortScope {
    /// Only the rows of the current page are sorted, after slicing.
    #[default]
    Page,
    /// The whole filtered set is sorted before slicing.
    Collection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: usize,
    page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, filtered_count: usize) -> usize {
        filtered_count.div_ceil(self.page_size).max(1)
    }

    /// Page index pulled back into `[1, total_pages]`.
    pub fn clamped_page(&self, filtered_count: usize) -> usize {
        self.current_page.clamp(1, self.total_pages(filtered_count))
    }

    pub fn clamp(&mut self, filtered_count: usize) {
        self.current_page = self.clamped_page(filtered_count);
    }

    pub fn set_page(&mut self, page: usize, filtered_count: usize) {
        self.current_page = page;
        self.clamp(filtered_count);
    }

    pub fn next(&mut self, filtered_count: usize) {
        if self.current_page < self.total_pages(filtered_count) {
            self.current_page += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRows {
    pub rows: Vec<Product>,
    /// Ids of every row passing the filter, across all pages.
    pub filtered_ids: Vec<ProductId>,
    pub current_page: usize,
    pub total_pages: usize,
}

impl ViewRows {
    pub fn filtered_count(&self) -> usize {
        self.filtered_ids.len()
    }
}

/// A product matches when its lowercased name starts with the lowercased
/// filter, or its id as a string starts with the filter verbatim.
pub fn matches_filter(product: &Product, filter: &str) -> bool {
    product.name.to_lowercase().starts_with(&filter.to_lowercase())
        || product.id.to_string().starts_with(filter)
}

pub fn filter<'a>(products: &'a [Product], filter: &str) -> Vec<&'a Product> {
    if filter.is_empty() {
        return products.iter().collect();
    }
    products
        .iter()
        .filter(|product| matches_filter(product, filter))
        .collect()
}

/// Stable sort; rows with equal keys keep their relative order.
pub fn sort(rows: &mut [&Product], config: SortConfig) {
    rows.sort_by(|a, b| config.compare(a, b));
}

pub fn paginate<'a, T>(rows: &'a [T], pagination: &Pagination) -> &'a [T] {
    let page = pagination.clamped_page(rows.len());
    let start = ((page - 1) * pagination.page_size()).min(rows.len());
    let end = (start + pagination.page_size()).min(rows.len());
    &rows[start..end]
}

pub fn visible_rows(
    products: &[Product],
    filter_text: &str,
    sort_config: SortConfig,
    pagination: &Pagination,
    scope: SortScope,
) -> ViewRows {
    let mut filtered = filter(products, filter_text);
    if scope == SortScope::Collection {
        sort(&mut filtered, sort_config);
    }

    let mut page_rows: Vec<&Product> = paginate(&filtered, pagination).to_vec();
    if scope == SortScope::Page {
        sort(&mut page_rows, sort_config);
    }

    ViewRows {
        rows: page_rows.into_iter().cloned().collect(),
        filtered_ids: filtered.iter().map(|product| product.id).collect(),
        current_page: pagination.clamped_page(filtered.len()),
        total_pages: pagination.total_pages(filtered.len()),
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
