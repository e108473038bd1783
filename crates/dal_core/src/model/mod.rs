//! Entity model for users and their orders.
//!
//! # Responsibility
//! - Define the records mapped onto the `Users` and `Orders` tables.
//! - Provide pre-write field validation mirroring the schema constraints.
//!
//! # Invariants
//! - Every entity is identified by an integer identity.
//! - Many orders reference one user; deleting the user deletes its orders.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod order;
pub mod user;

/// Field-level constraint failure detected before a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Required(&'static str),
    TooLong {
        field: &'static str,
        max_chars: usize,
        actual: usize,
    },
    OutOfRange {
        field: &'static str,
        detail: String,
    },
    TooPrecise {
        field: &'static str,
        max_scale: u32,
        actual: u32,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required(field) => write!(f, "{field} is required"),
            Self::TooLong {
                field,
                max_chars,
                actual,
            } => write!(
                f,
                "{field} exceeds {max_chars} characters (got {actual})"
            ),
            Self::OutOfRange { field, detail } => write!(f, "{field} out of range: {detail}"),
            Self::TooPrecise {
                field,
                max_scale,
                actual,
            } => write!(
                f,
                "{field} allows {max_scale} fractional digits (got {actual})"
            ),
        }
    }
}

impl Error for ValidationError {}
