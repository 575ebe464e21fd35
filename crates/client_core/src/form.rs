use shared::domain::{Product, ProductId};

use crate::error::FormError;

/// What a valid submit asks the controller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSubmission {
    Create { name: String },
    Update(Product),
}

/// Add/edit form state: a single name field plus its validation error.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    name: String,
    error: Option<FormError>,
}

impl ProductForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    /// Seeds the field from the product being edited, or empties it.
    pub fn prefill(&mut self, selected: Option<&Product>) {
        self.name = selected.map(|p| p.name.clone()).unwrap_or_default();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.error = None;
    }

    /// Validates the field. With a selected product the submit becomes an
    /// update of that product's id, otherwise a create.
    pub fn submit(&mut self, selected: Option<ProductId>) -> Result<FormSubmission, FormError> {
        if self.name.trim().is_empty() {
            self.error = Some(FormError::EmptyName);
            return Err(FormError::EmptyName);
        }
        self.error = None;

        let name = self.name.clone();
        Ok(match selected {
            Some(id) => FormSubmission::Update(Product::new(id, name)),
            None => FormSubmission::Create { name },
        })
    }

    pub fn reset(&mut self) {
        self.name.clear();
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected_and_kept_as_error() {
        let mut form = ProductForm::new();
        form.set_name("   ");
        assert_eq!(form.submit(None), Err(FormError::EmptyName));
        assert_eq!(form.error(), Some(&FormError::EmptyName));

        form.set_name("Kiwi");
        assert!(form.error().is_none());
    }

    #[test]
    fn selected_product_turns_submit_into_update() {
        let mut form = ProductForm::new();
        let apple = Product::new(ProductId(1), "Apple");
        form.prefill(Some(&apple));
        assert_eq!(form.name(), "Apple");

        form.set_name("Green Apple");
        assert_eq!(
            form.submit(Some(apple.id)),
            Ok(FormSubmission::Update(Product::new(ProductId(1), "Green Apple")))
        );
    }

    #[test]
    fn submit_without_selection_creates() {
        let mut form = ProductForm::new();
        form.set_name("Kiwi");
        assert_eq!(
            form.submit(None),
            Ok(FormSubmission::Create {
                name: "Kiwi".to_string()
            })
        );

        form.reset();
        assert_eq!(form.name(), "");
        form.prefill(None);
        assert_eq!(form.name(), "");
    }
}
