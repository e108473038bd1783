//! User domain model.
//!
//! # Responsibility
//! - Define the `User` record persisted in the `Users` table.
//! - Validate field bounds before any write reaches the store.
//!
//! # Invariants
//! - `id` is `None` until the store (or the caller) assigns an identity.
//! - Once assigned, `id` never changes for the lifetime of the row.
//! - Name and email fields are non-blank and within their length bounds.

use crate::model::ValidationError;
use serde::{Deserialize, Serialize};

/// Integer identity of a `Users` row.
pub type UserId = i64;

pub const FIRST_NAME_MAX_CHARS: usize = 50;
pub const LAST_NAME_MAX_CHARS: usize = 50;
pub const EMAIL_MAX_CHARS: usize = 100;

/// Customer record owning zero or more orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// `None` lets the store generate the identity on insert.
    pub id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl User {
    /// Creates a user whose identity will be generated by the store.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }

    /// Creates a user with a caller-assigned identity.
    pub fn with_id(
        id: UserId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id),
            ..Self::new(first_name, last_name, email)
        }
    }

    /// Checks required fields and length bounds.
    ///
    /// # Errors
    /// - Returns the first violated field constraint.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("first_name", &self.first_name, FIRST_NAME_MAX_CHARS)?;
        check_text("last_name", &self.last_name, LAST_NAME_MAX_CHARS)?;
        check_text("email", &self.email, EMAIL_MAX_CHARS)?;
        Ok(())
    }

    /// Display name in `First Last` form.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

pub(crate) fn check_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    let actual = value.chars().count();
    if actual > max_chars {
        return Err(ValidationError::TooLong {
            field,
            max_chars,
            actual,
        });
    }
    Ok(())
}
