//! The catalog record and the input shapes that create or modify it.
//!
//! [`ProductDraft`] is the validated form of create input: it can only be
//! built through [`ProductDraft::new`], so a [`Product`] never exists
//! without a name and a finite price. [`ProductPatch`] carries a partial
//! update where every absent (or `null`) field means "keep the current
//! value".

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, FieldError};
use crate::id::ProductId;

/// A catalog record.
///
/// Optional fields serialize as `null` rather than being omitted, so the
/// stored and served shape always carries all five keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

impl Product {
    /// Builds a product from validated input and a store-assigned id.
    pub fn from_draft(id: ProductId, draft: ProductDraft) -> Self {
        Product {
            id,
            name: draft.name,
            price: draft.price,
            description: draft.description,
            categories: draft.categories,
        }
    }

    /// Applies a partial update. Absent fields keep their current value.
    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(categories) = patch.categories {
            self.categories = Some(categories);
        }
    }
}

/// Validated input for creating a product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    name: String,
    price: f64,
    description: Option<String>,
    categories: Option<Vec<String>>,
}

impl ProductDraft {
    /// Validates raw create input.
    ///
    /// Collects every field error instead of stopping at the first one.
    pub fn new(
        name: Option<String>,
        price: Option<f64>,
        description: Option<String>,
        categories: Option<Vec<String>>,
    ) -> Result<Self, CoreError> {
        let mut errors = Vec::new();

        match &name {
            None => errors.push(FieldError::new("name", "is required")),
            Some(n) => check_name(n, &mut errors),
        }
        match price {
            None => errors.push(FieldError::new("price", "is required")),
            Some(p) => check_price(p, &mut errors),
        }

        match (name, price) {
            (Some(name), Some(price)) if errors.is_empty() => Ok(ProductDraft {
                name,
                price,
                description,
                categories,
            }),
            _ => Err(CoreError::Validation(errors)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }
}

/// A partial update. `None` means "leave unchanged", never "clear".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

impl ProductPatch {
    /// Returns `true` when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.categories.is_none()
    }

    /// Checks the provided fields with the same rules as creation.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            check_name(name, &mut errors);
        }
        if let Some(price) = self.price {
            check_price(price, &mut errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(errors))
        }
    }
}

fn check_name(name: &str, errors: &mut Vec<FieldError>) {
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "must not be blank"));
    }
}

fn check_price(price: f64, errors: &mut Vec<FieldError>) {
    if !price.is_finite() {
        errors.push(FieldError::new("price", "must be a finite number"));
    }
}
