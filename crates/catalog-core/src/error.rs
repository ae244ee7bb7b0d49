//! Core error types for catalog-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering
//! validation of client input and record lookup.

use serde::Serialize;
use thiserror::Error;

use crate::id::ProductId;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the offending field as it appears on the wire.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Core errors produced by the catalog-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// One or more input fields failed validation.
    #[error("validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    /// No product carries the requested id.
    #[error("product not found: ProductId({id})", id = .id.0)]
    ProductNotFound { id: ProductId },

    /// The id space is used up (the current maximum is `u64::MAX`).
    #[error("no product id left after ProductId({last})", last = .last.0)]
    IdSpaceExhausted { last: ProductId },
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}
