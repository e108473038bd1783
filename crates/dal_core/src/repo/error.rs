//! Repository error taxonomy.

use crate::db::DbError;
use crate::model::ValidationError;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error surfaced by user/order repository operations.
///
/// Lookups never produce `NotFound`; they return `None` or an empty list.
#[derive(Debug)]
pub enum RepoError {
    /// A required input was absent; raised before touching the store.
    InvalidArgument(&'static str),
    /// A write broke a required/length/range/foreign-key constraint.
    ConstraintViolation(ConstraintViolation),
    /// `update` addressed an identity with no row behind it.
    NotFound { entity: &'static str, id: i64 },
    Db(DbError),
    /// A persisted row could not be mapped back to the model.
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

/// Origin of a constraint failure.
#[derive(Debug)]
pub enum ConstraintViolation {
    /// Caught by model validation; the statement was never sent.
    Field(ValidationError),
    /// Reported by SQLite (NOT NULL, CHECK, PRIMARY KEY, FOREIGN KEY).
    Store(rusqlite::Error),
}

impl RepoError {
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation(_))
    }
}

impl Display for ConstraintViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::ConstraintViolation(err) => write!(f, "constraint violation: {err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ConstraintViolation(ConstraintViolation::Field(err)) => Some(err),
            Self::ConstraintViolation(ConstraintViolation::Store(err)) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidArgument(_)
            | Self::NotFound { .. }
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::ConstraintViolation(ConstraintViolation::Field(value))
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if value.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
            Self::ConstraintViolation(ConstraintViolation::Store(value))
        } else {
            Self::Db(DbError::Sqlite(value))
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => err.into(),
            other => Self::Db(other),
        }
    }
}
