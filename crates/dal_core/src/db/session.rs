//! Persistence context with scoped sessions.
//!
//! # Responsibility
//! - Ensure the schema exists once, when the [`Store`] is opened.
//! - Hand out one [`Session`] (one connection) per unit of work.
//! - Bind repositories to a session's connection.
//!
//! # Invariants
//! - A session releases its connection when dropped, on every exit path.
//! - `Session::unit_of_work` commits only when the work returns `Ok`;
//!   errors and panics roll the transaction back.
//! - A session is not `Sync`: concurrent writers each open their own session.

use super::config::{StoreConfig, StoreLocation};
use super::open::{open_file, open_logged};
use super::DbResult;
use crate::repo::order_repo::SqliteOrderRepository;
use crate::repo::user_repo::SqliteUserRepository;
use log::debug;
use rusqlite::{Connection, Transaction};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

/// Shared persistence context for the users/orders store.
///
/// Sessions may be used from different threads at once. On a file store a
/// blocked writer waits up to `busy_timeout`; on a memory store (a SQLite
/// shared-cache database) it waits for the holder to finish through SQLite's
/// unlock notification.
pub struct Store {
    config: StoreConfig,
    target: Target,
    /// Keeps a shared-cache in-memory database alive between sessions.
    _anchor: Option<Mutex<Connection>>,
}

enum Target {
    File(PathBuf),
    SharedMemory(String),
}

impl Target {
    fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::SharedMemory(_) => "shared_memory",
        }
    }

    fn connect(&self, busy_timeout: Duration) -> DbResult<Connection> {
        match self {
            Self::File(path) => open_logged(self.mode(), busy_timeout, || open_file(path)),
            Self::SharedMemory(uri) => {
                open_logged(self.mode(), busy_timeout, || Connection::open(uri))
            }
        }
    }
}

impl Store {
    /// Opens the store and makes sure schema and seed rows exist.
    ///
    /// # Errors
    /// - Returns an error when the database cannot be opened or migrated.
    pub fn open(config: StoreConfig) -> DbResult<Self> {
        let target = match &config.location {
            StoreLocation::File(path) => Target::File(path.clone()),
            StoreLocation::Memory => Target::SharedMemory(format!(
                "file:dal-{}?mode=memory&cache=shared",
                Uuid::new_v4().simple()
            )),
        };

        let bootstrap = target.connect(config.busy_timeout)?;
        let anchor = match target {
            Target::SharedMemory(_) => Some(Mutex::new(bootstrap)),
            Target::File(_) => None,
        };

        Ok(Self {
            config,
            target,
            _anchor: anchor,
        })
    }

    /// Parses `connection_string` and opens the store.
    ///
    /// # Errors
    /// - Returns an error for an invalid string or a failed open.
    pub fn from_connection_string(connection_string: &str) -> DbResult<Self> {
        Self::open(StoreConfig::from_connection_string(connection_string)?)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Acquires a new session with its own connection.
    ///
    /// # Errors
    /// - Returns an error when the connection cannot be opened.
    pub fn session(&self) -> DbResult<Session> {
        let conn = self.target.connect(self.config.busy_timeout)?;
        debug!(
            "event=session_open module=db status=ok mode={}",
            self.target.mode()
        );
        Ok(Session { conn })
    }

    /// Runs `work` against a fresh session and releases it afterwards.
    ///
    /// # Errors
    /// - Returns the session acquisition error or whatever `work` returns.
    pub fn with_session<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut Session) -> Result<T, E>,
        E: From<super::DbError>,
    {
        let mut session = self.session()?;
        work(&mut session)
    }
}

/// One live connection to the store.
pub struct Session {
    conn: Connection,
}

impl Session {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn users(&self) -> SqliteUserRepository<'_> {
        SqliteUserRepository::new(&self.conn)
    }

    pub fn orders(&self) -> SqliteOrderRepository<'_> {
        SqliteOrderRepository::new(&self.conn)
    }

    /// Runs `work` inside one transaction.
    ///
    /// Repositories built from the transaction
    /// (`SqliteUserRepository::try_new(tx)`) join it instead of committing on
    /// their own.
    ///
    /// # Errors
    /// - Returns the error produced by `work` (after rollback), or the
    ///   begin/commit failure.
    pub fn unit_of_work<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<rusqlite::Error>,
    {
        let tx = self.conn.transaction()?;
        match work(&tx) {
            Ok(value) => {
                tx.commit()?;
                debug!("event=unit_of_work module=db status=ok");
                Ok(value)
            }
            Err(err) => {
                debug!("event=unit_of_work module=db status=rollback");
                drop(tx);
                Err(err)
            }
        }
    }
}
