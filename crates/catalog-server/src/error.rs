//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. It implements
//! `axum::response::IntoResponse` to produce structured JSON error responses
//! with appropriate HTTP status codes.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use catalog_core::{CoreError, FieldError};
use catalog_storage::StorageError;

/// Message returned for every lookup of an absent product.
pub const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Error body returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Human-readable error message.
    pub message: String,
    /// Machine-readable error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Optional structured details (e.g., rejected fields).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API errors with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Entity not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request body could not be decoded (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Request decoded but its fields are invalid (422).
    #[error("validation failed")]
    ValidationFailed(Vec<FieldError>),

    /// Internal server error (500), including persistence failures.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn product_not_found() -> Self {
        ApiError::NotFound(PRODUCT_NOT_FOUND.to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            ApiError::NotFound(message) => ApiErrorDetail {
                message,
                code: "NOT_FOUND".to_string(),
                details: None,
            },
            ApiError::BadRequest(message) => ApiErrorDetail {
                message,
                code: "BAD_REQUEST".to_string(),
                details: None,
            },
            ApiError::ValidationFailed(errors) => ApiErrorDetail {
                message: format!("{} validation error(s)", errors.len()),
                code: "VALIDATION_FAILED".to_string(),
                details: serde_json::to_value(errors).ok(),
            },
            ApiError::InternalError(message) => ApiErrorDetail {
                message,
                code: "INTERNAL_ERROR".to_string(),
                details: None,
            },
        };

        (status, axum::Json(detail)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(errors) => ApiError::ValidationFailed(errors),
            CoreError::ProductNotFound { .. } => ApiError::product_not_found(),
            CoreError::IdSpaceExhausted { last } => {
                ApiError::InternalError(format!("no product id left after {}", last))
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::InternalError(format!("failed to persist products: {}", err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
