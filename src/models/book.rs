//! Book model and related types

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

use super::{first_validation_message, optional_field};

/// Book record from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub publication_year: Option<i32>,
    pub author_id: i64,
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ISBN: {})", self.title, self.isbn)
    }
}

/// Book joined with the name of its author, as shown in the catalog listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookListing {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub publication_year: Option<i32>,
    pub author_id: i64,
    pub author_name: String,
}

/// Book creation form, as submitted by the browser
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BookForm {
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub title: String,
    /// Integer year, empty when unknown
    #[serde(default)]
    pub publication_year: String,
    /// ID of one of the authors offered by `GET /add_book`
    #[serde(default)]
    pub author_id: String,
}

/// Validated book ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewBook {
    #[validate(length(max = 13, message = "ISBN must be at most 13 characters."))]
    pub isbn: String,
    #[validate(length(max = 250, message = "Title must be at most 250 characters."))]
    pub title: String,
    pub publication_year: Option<i32>,
    pub author_id: i64,
}

impl TryFrom<&BookForm> for NewBook {
    type Error = AppError;

    fn try_from(form: &BookForm) -> AppResult<Self> {
        let isbn = form.isbn.trim();
        let title = form.title.trim();
        if isbn.is_empty() || title.is_empty() {
            return Err(AppError::Validation("ISBN and title are required.".to_string()));
        }

        let publication_year = optional_field(&form.publication_year)
            .map(|value| {
                value.parse::<i32>().map_err(|_| {
                    AppError::Validation(format!(
                        "Publication year '{}' is not a valid year.",
                        value
                    ))
                })
            })
            .transpose()?;

        let author_id = optional_field(&form.author_id)
            .ok_or_else(|| AppError::Validation("Please select an author.".to_string()))?;
        let author_id = author_id
            .parse::<i64>()
            .map_err(|_| AppError::Validation(format!("Invalid author id '{}'.", author_id)))?;

        let book = NewBook {
            isbn: isbn.to_string(),
            title: title.to_string(),
            publication_year,
            author_id,
        };
        book.validate()
            .map_err(|e| AppError::Validation(first_validation_message(&e)))?;
        Ok(book)
    }
}

/// Ordering of the catalog listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSort {
    Title,
    Author,
}

impl BookSort {
    /// Unknown values leave the listing unsorted
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(BookSort::Title),
            "author" => Some(BookSort::Author),
            _ => None,
        }
    }
}

/// Catalog listing query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// `title` or `author`
    pub sort: Option<String>,
    /// Case-insensitive substring of the title or ISBN
    pub search_term: Option<String>,
}

impl BookQuery {
    pub fn sort(&self) -> Option<BookSort> {
        self.sort.as_deref().and_then(BookSort::parse)
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref().and_then(optional_field)
    }
}
