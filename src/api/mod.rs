//! HTTP handlers and routing

pub mod catalog;
pub mod flash;
pub mod health;
pub mod openapi;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let pages = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalog
        .route("/", get(catalog::list_books))
        .route("/add_author", get(catalog::add_author_form).post(catalog::add_author))
        .route("/add_book", get(catalog::add_book_form).post(catalog::add_book))
        .route("/book/:id/delete", post(catalog::delete_book))
        .with_state(state);

    Router::new()
        .merge(pages)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
}
