//! Product request types.
//!
//! Responses use [`catalog_core::Product`] directly. Partial updates
//! deserialize straight into [`catalog_core::ProductPatch`].

use serde::Deserialize;

use catalog_core::ProductDraft;

use crate::error::ApiError;

/// Body of `POST /products`.
///
/// Every field is optional at the JSON level so that missing required
/// fields are reported together as a validation error rather than as a
/// decoding failure. Any `id` in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

impl CreateProductRequest {
    /// Validates the request into a draft the catalog accepts.
    pub fn into_draft(self) -> Result<ProductDraft, ApiError> {
        Ok(ProductDraft::new(
            self.name,
            self.price,
            self.description,
            self.categories,
        )?)
    }
}
