//! API routes for sync-server

pub mod bulk;
pub mod health;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use shared::error::AppError;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the router
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    let bulk = Router::new()
        .route("/catalogs", post(bulk::catalogs))
        .route("/products", post(bulk::products))
        .route("/product-prices", post(bulk::product_prices))
        .route("/product-stock", post(bulk::product_stock))
        .route("/product-unit-of-measure", post(bulk::product_unit_of_measure))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(bulk)
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::not_found("Route")
}
