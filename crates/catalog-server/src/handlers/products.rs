//! Product handlers (list, get, create, update, delete).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use catalog_core::{Product, ProductId, ProductPatch};

use crate::error::ApiError;
use crate::schema::products::CreateProductRequest;
use crate::state::AppState;

/// A path segment that is not a non-negative integer cannot name a
/// product, so it is reported the same way as an absent id.
fn parse_id(raw: &str) -> Result<ProductId, ApiError> {
    raw.parse().map_err(|_| ApiError::product_not_found())
}

/// Lists all products in insertion order.
///
/// `GET /products`
pub async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    let catalog = state.catalog.lock().await;
    Json(catalog.list().to_vec())
}

/// Fetches one product.
///
/// `GET /products/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_id(&id)?;
    let catalog = state.catalog.lock().await;
    Ok(Json(catalog.get(id)?.clone()))
}

/// Creates a product.
///
/// `POST /products`
pub async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(req) = body?;
    let draft = req.into_draft()?;
    let mut catalog = state.catalog.lock().await;
    let product = catalog.create(draft)?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Updates the provided fields of a product.
///
/// `PUT /products/{id}`
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_id(&id)?;
    let Json(patch) = body?;
    let mut catalog = state.catalog.lock().await;
    Ok(Json(catalog.update(id, patch)?))
}

/// Deletes a product.
///
/// `DELETE /products/{id}`
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let mut catalog = state.catalog.lock().await;
    catalog.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
