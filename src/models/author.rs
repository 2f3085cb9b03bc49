//! Author model and related types

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

use super::{first_validation_message, optional_field};

/// Author record from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ID: {})", self.name, self.id)
    }
}

/// Author creation form, as submitted by the browser.
///
/// Every field is kept as raw text so a rejected form can be handed back
/// to the user unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AuthorForm {
    #[serde(default)]
    pub name: String,
    /// `YYYY-MM-DD`, empty when unknown
    #[serde(default)]
    pub birth_date: String,
    /// `YYYY-MM-DD`, empty when unknown or still alive
    #[serde(default)]
    pub date_of_death: String,
}

/// Validated author ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewAuthor {
    #[validate(length(max = 100, message = "Author name must be at most 100 characters."))]
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl TryFrom<&AuthorForm> for NewAuthor {
    type Error = AppError;

    fn try_from(form: &AuthorForm) -> AppResult<Self> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Author name is required.".to_string()));
        }

        let birth_date = parse_date(&form.birth_date, "birth date")?;
        let date_of_death = parse_date(&form.date_of_death, "date of death")?;

        if let (Some(born), Some(died)) = (birth_date, date_of_death) {
            if died < born {
                return Err(AppError::Validation(
                    "Date of death cannot be before birth date.".to_string(),
                ));
            }
        }

        let author = NewAuthor {
            name: name.to_string(),
            birth_date,
            date_of_death,
        };
        author
            .validate()
            .map_err(|e| AppError::Validation(first_validation_message(&e)))?;
        Ok(author)
    }
}

fn parse_date(raw: &str, label: &str) -> AppResult<Option<NaiveDate>> {
    optional_field(raw)
        .map(|value| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                AppError::Validation(format!(
                    "Invalid {} '{}'. Please use the YYYY-MM-DD format.",
                    label, value
                ))
            })
        })
        .transpose()
}
