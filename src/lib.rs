//! Bookshelf Library Catalog
//!
//! A small catalog server: register authors and their books, list, search
//! and sort the catalog, and delete books (pruning authors left with none).

use std::sync::Arc;

use sqlx::{Pool, Sqlite};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        let repository = repository::Repository::new(pool);
        Self {
            services: Arc::new(services::Services::new(repository)),
        }
    }
}
