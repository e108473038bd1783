//! Store configuration and connection-string parsing.
//!
//! Accepted connection strings:
//! - `:memory:` or a bare file path;
//! - `key=value` pairs separated by `;`, with keys `Data Source` /
//!   `DataSource` / `Filename` (location) and `Busy Timeout` /
//!   `Default Timeout` (whole seconds). Keys are case-insensitive.

use super::open::DEFAULT_BUSY_TIMEOUT;
use super::{DbError, DbResult};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const MEMORY_SOURCE: &str = ":memory:";

/// Where the store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    /// Private in-memory database shared by all sessions of one `Store`.
    Memory,
}

/// Construction-time settings for a [`super::Store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: StoreLocation,
    /// How long a connection waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::File(path.into()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::Memory,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Parses an ADO-style connection string.
    ///
    /// # Errors
    /// - `InvalidConnectionString` for empty input, unknown keys, malformed
    ///   pairs, a non-numeric timeout or a missing data source.
    pub fn from_connection_string(value: &str) -> DbResult<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(invalid("connection string cannot be empty"));
        }

        if !trimmed.contains('=') {
            return Ok(Self {
                location: parse_location(trimmed),
                busy_timeout: DEFAULT_BUSY_TIMEOUT,
            });
        }

        let mut location = None;
        let mut busy_timeout = DEFAULT_BUSY_TIMEOUT;

        for pair in trimmed.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, raw) = pair
                .split_once('=')
                .ok_or_else(|| invalid(format!("expected key=value, got `{pair}`")))?;
            let raw = raw.trim();

            match normalize_key(key).as_str() {
                "datasource" | "filename" => {
                    if raw.is_empty() {
                        return Err(invalid("data source cannot be empty"));
                    }
                    location = Some(parse_location(raw));
                }
                "busytimeout" | "defaulttimeout" => {
                    let seconds = raw
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("timeout must be whole seconds, got `{raw}`")))?;
                    busy_timeout = Duration::from_secs(seconds);
                }
                _ => return Err(invalid(format!("unsupported key `{}`", key.trim()))),
            }
        }

        let location = location.ok_or_else(|| invalid("missing `Data Source`"))?;
        Ok(Self {
            location,
            busy_timeout,
        })
    }
}

impl FromStr for StoreConfig {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_connection_string(s)
    }
}

fn parse_location(raw: &str) -> StoreLocation {
    if raw.eq_ignore_ascii_case(MEMORY_SOURCE) {
        StoreLocation::Memory
    } else {
        StoreLocation::File(PathBuf::from(raw))
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn invalid(reason: impl Into<String>) -> DbError {
    DbError::InvalidConnectionString(reason.into())
}
