//! Data models for Bookshelf

pub mod author;
pub mod book;

use validator::ValidationErrors;

// Re-export commonly used types
pub use author::{Author, AuthorForm, NewAuthor};
pub use book::{Book, BookForm, BookListing, BookQuery, BookSort, NewBook};

/// Trimmed form field, or `None` when left blank
pub(crate) fn optional_field(raw: &str) -> Option<&str> {
    let value = raw.trim();
    (!value.is_empty()).then_some(value)
}

/// Pick a deterministic message out of a validator error set
pub(crate) fn first_validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_values()
        .flat_map(|errs| errs.iter())
        .map(|e| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string())
        })
        .collect();
    messages.sort();
    messages
        .into_iter()
        .next()
        .unwrap_or_else(|| errors.to_string())
}
