//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{catalog, flash, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf",
        version = "0.1.0",
        description = "Library catalog: authors, books, search and cleanup"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        catalog::add_author_form,
        catalog::add_author,
        catalog::add_book_form,
        catalog::add_book,
        catalog::list_books,
        catalog::delete_book,
    ),
    components(
        schemas(
            crate::models::author::Author,
            crate::models::author::AuthorForm,
            crate::models::book::Book,
            crate::models::book::BookListing,
            crate::models::book::BookForm,
            catalog::AuthorFormView,
            catalog::BookFormView,
            catalog::BookListView,
            flash::FlashMessage,
            flash::FlashCategory,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "authors", description = "Author registration"),
        (name = "books", description = "Book registration, listing and deletion")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
