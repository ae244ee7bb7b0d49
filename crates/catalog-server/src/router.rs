//! Router assembly for the catalog HTTP API.
//!
//! [`build_router`] wires the REST and WebSocket handlers to their routes
//! with CORS and tracing middleware layers. [`build_broadcast_router`]
//! serves only the WebSocket upgrade, for the dedicated broadcast port.

use std::path::Path;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router with all API routes.
///
/// Routes use axum 0.8 `/{param}` path syntax.
/// CORS is permissive (the catalog front-end may be served from anywhere).
/// When `static_dir` is given, unmatched paths are served from it.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        .route(
            "/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/products/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route("/ws", get(handlers::socket::upgrade));

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Builds the router for the dedicated broadcast listener.
pub fn build_broadcast_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::socket::upgrade))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
