//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `Users` table.
//! - Map rows to `User` and SQLite failures to `RepoError`.
//!
//! # Invariants
//! - `delete` is a silent no-op for a missing identity.
//! - Deleting a user removes its orders through `ON DELETE CASCADE`.
//! - `update` on a missing identity reports `RepoError::NotFound`.

use crate::model::user::{User, UserId};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::{ensure_connection_ready, in_write_scope};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT Id, FirstName, LastName, Email FROM Users";

/// Repository interface for user CRUD operations.
pub trait UserRepository {
    /// Returns the user, or `None` when no row has this identity.
    fn get_by_id(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Returns every user ordered by identity.
    fn get_all(&self) -> RepoResult<Vec<User>>;
    /// Inserts `user` and returns its (possibly store-generated) identity.
    fn add(&self, user: &User) -> RepoResult<UserId>;
    /// Replaces every column of the row identified by `user.id`.
    fn update(&self, user: &User) -> RepoResult<()>;
    /// Removes the user (and its orders); returns whether a row was removed.
    fn delete(&self, id: UserId) -> RepoResult<bool>;
    fn exists(&self, id: UserId) -> RepoResult<bool>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version does not match.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn get_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE Id = ?1;"),
                [id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn get_all(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY Id ASC;"))?;
        let users = stmt
            .query_map([], parse_user_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn add(&self, user: &User) -> RepoResult<UserId> {
        if matches!(user.id, Some(id) if id <= 0) {
            return Err(RepoError::InvalidArgument(
                "caller-assigned user id must be positive",
            ));
        }
        user.validate()?;

        self.conn.execute(
            "INSERT INTO Users (Id, FirstName, LastName, Email)
             VALUES (?1, ?2, ?3, ?4);",
            params![user.id, user.first_name, user.last_name, user.email],
        )?;

        let id = user.id.unwrap_or_else(|| self.conn.last_insert_rowid());
        debug!("event=user_add module=repo status=ok user_id={id}");
        Ok(id)
    }

    fn update(&self, user: &User) -> RepoResult<()> {
        let id = user
            .id
            .ok_or(RepoError::InvalidArgument("user id is required for update"))?;
        user.validate()?;

        let changed = self.conn.execute(
            "UPDATE Users
             SET
                FirstName = ?2,
                LastName = ?3,
                Email = ?4
             WHERE Id = ?1;",
            params![id, user.first_name, user.last_name, user.email],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }

        debug!("event=user_update module=repo status=ok user_id={id}");
        Ok(())
    }

    fn delete(&self, id: UserId) -> RepoResult<bool> {
        in_write_scope(self.conn, |conn| {
            if !user_exists(conn, id)? {
                debug!("event=user_delete module=repo status=noop user_id={id}");
                return Ok(false);
            }

            conn.execute("DELETE FROM Users WHERE Id = ?1;", [id])?;
            debug!("event=user_delete module=repo status=ok user_id={id}");
            Ok(true)
        })
    }

    fn exists(&self, id: UserId) -> RepoResult<bool> {
        user_exists(self.conn, id)
    }
}

fn user_exists(conn: &Connection, id: UserId) -> RepoResult<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM Users WHERE Id = ?1);",
        [id],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(exists)
}

/// Maps `Id, FirstName, LastName, Email` columns to a `User`.
pub(crate) fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: Some(row.get("Id")?),
        first_name: row.get("FirstName")?,
        last_name: row.get("LastName")?,
        email: row.get("Email")?,
    })
}
