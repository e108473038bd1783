//! SQLite persistence context: configuration, connection bootstrap, schema.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the users/orders store.
//! - Apply schema migrations (including seed rows) in deterministic order.
//! - Hand out scoped sessions through [`Store`].
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Every connection handed out has `foreign_keys=ON`, so the
//!   `Orders.UserId` cascade is always active.
//! - No application data is read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod config;
pub mod migrations;
mod open;
mod session;

pub use config::{StoreConfig, StoreLocation};
pub use open::{open_db, open_db_in_memory, DEFAULT_BUSY_TIMEOUT};
pub use session::{Session, Store};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    InvalidConnectionString(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::InvalidConnectionString(reason) => {
                write!(f, "invalid connection string: {reason}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::InvalidConnectionString(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
