//! Data-access layer for users and their orders.
//!
//! A SQLite persistence context ([`db::Store`]) plus one repository per
//! entity. Repositories are thin: each call is one query or one committed
//! write, and store failures are surfaced unchanged.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use db::{open_db, open_db_in_memory, DbError, DbResult, Session, Store, StoreConfig};
pub use logging::{default_log_level, flush_logging, init_logging, logging_status};
pub use model::order::{Order, OrderId};
pub use model::user::{User, UserId};
pub use model::ValidationError;
pub use repo::error::{ConstraintViolation, RepoError, RepoResult};
pub use repo::order_repo::{OrderRepository, SqliteOrderRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
