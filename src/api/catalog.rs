//! Catalog page endpoints
//!
//! Pages are rendered as JSON views. Successful submissions redirect back to
//! the form with a flash message; rejected submissions re-render the form
//! with what the user typed and the error.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorForm},
        book::{BookForm, BookListing, BookQuery},
    },
    AppState,
};

use super::flash::{self, FlashMessage};

/// Author creation page
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorFormView {
    /// Values to pre-fill the form with
    pub form: AuthorForm,
    pub messages: Vec<FlashMessage>,
}

/// Book creation page
#[derive(Debug, Serialize, ToSchema)]
pub struct BookFormView {
    pub form: BookForm,
    /// Selectable authors; empty when none are registered yet
    pub authors: Vec<Author>,
    pub messages: Vec<FlashMessage>,
}

/// Catalog listing page
#[derive(Debug, Serialize, ToSchema)]
pub struct BookListView {
    pub books: Vec<BookListing>,
    pub sort: Option<String>,
    pub search_term: Option<String>,
    pub messages: Vec<FlashMessage>,
}

/// Show the author creation form
#[utoipa::path(
    get,
    path = "/add_author",
    tag = "authors",
    responses(
        (status = 200, description = "Author form", body = AuthorFormView)
    )
)]
pub async fn add_author_form(jar: CookieJar) -> (CookieJar, Json<AuthorFormView>) {
    let (jar, messages) = flash::take(jar);
    (
        jar,
        Json(AuthorFormView {
            form: AuthorForm::default(),
            messages,
        }),
    )
}

/// Register a new author
#[utoipa::path(
    post,
    path = "/add_author",
    tag = "authors",
    request_body(content = AuthorForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Author created, redirects to the form"),
        (status = 400, description = "Invalid input, form re-rendered", body = AuthorFormView)
    )
)]
pub async fn add_author(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<AuthorForm>,
) -> AppResult<Response> {
    match state.services.catalog.create_author(&form).await {
        Ok(author) => Ok(flash::redirect(
            jar,
            "/add_author",
            FlashMessage::success(format!("Author '{}' added successfully.", author.name)),
        )),
        Err(e) if e.is_user_facing() => {
            let (jar, mut messages) = flash::take(jar);
            messages.push(FlashMessage::error(e.user_message()));
            Ok((e.status_code(), jar, Json(AuthorFormView { form, messages })).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Show the book creation form with every registered author
#[utoipa::path(
    get,
    path = "/add_book",
    tag = "books",
    responses(
        (status = 200, description = "Book form", body = BookFormView)
    )
)]
pub async fn add_book_form(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<BookFormView>)> {
    let authors = state.services.catalog.list_authors().await?;
    let (jar, messages) = flash::take(jar);
    Ok((
        jar,
        Json(BookFormView {
            form: BookForm::default(),
            authors,
            messages,
        }),
    ))
}

/// Register a new book
#[utoipa::path(
    post,
    path = "/add_book",
    tag = "books",
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Book created, redirects to the form"),
        (status = 400, description = "Invalid input", body = BookFormView),
        (status = 409, description = "ISBN already used", body = BookFormView),
        (status = 422, description = "Unknown author", body = BookFormView)
    )
)]
pub async fn add_book(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<BookForm>,
) -> AppResult<Response> {
    match state.services.catalog.create_book(&form).await {
        Ok(book) => Ok(flash::redirect(
            jar,
            "/add_book",
            FlashMessage::success(format!("Book '{}' added successfully.", book.title)),
        )),
        Err(e) if e.is_user_facing() => {
            let authors = state.services.catalog.list_authors().await?;
            let (jar, mut messages) = flash::take(jar);
            messages.push(FlashMessage::error(e.user_message()));
            let view = BookFormView {
                form,
                authors,
                messages,
            };
            Ok((e.status_code(), jar, Json(view)).into_response())
        }
        Err(e) => Err(e),
    }
}

/// List, search and sort the catalog
#[utoipa::path(
    get,
    path = "/",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Catalog listing", body = BookListView)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<BookQuery>,
) -> AppResult<(CookieJar, Json<BookListView>)> {
    let result = state.services.catalog.list_books(&query).await?;
    let (jar, mut messages) = flash::take(jar);
    if let Some(message) = result.message {
        messages.push(FlashMessage::info(message));
    }

    Ok((
        jar,
        Json(BookListView {
            books: result.books,
            sort: query.sort().and(query.sort.clone()),
            search_term: query.search_term().map(String::from),
            messages,
        }),
    ))
}

/// Delete a book, pruning its author when it was their last one
#[utoipa::path(
    post,
    path = "/book/{id}/delete",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 303, description = "Redirects to the listing with the outcome")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let message = match state.services.catalog.delete_book(id).await {
        Ok(deleted) => FlashMessage::success(deleted.message()),
        Err(AppError::NotFound(msg)) => {
            tracing::debug!("Delete of missing book {}", id);
            FlashMessage::error(msg)
        }
        Err(e) => return Err(e),
    };
    Ok(flash::redirect(jar, "/", message))
}
