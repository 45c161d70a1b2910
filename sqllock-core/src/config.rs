//! Connection and manager configuration.
//!
//! Every field has a default, so a partial JSON document (or none at all) is valid:
//! ```json
//! { "table_prefix": "jobs", "connection": { "database": "/var/lib/app/locks.db" } }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const DEFAULT_TABLE_PREFIX: &str = "sqllock";

pub const ENV_DATABASE: &str = "SQLLOCK_DATABASE";
pub const ENV_TABLE_PREFIX: &str = "SQLLOCK_TABLE_PREFIX";

/// Where the lock table lives and how connections to it are pooled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionDescriptor {
    /// SQLite database file shared by every contending process
    pub database: PathBuf,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// How long to wait for a free pooled connection
    pub connection_timeout_ms: u64,
    /// How long a statement waits on SQLite's file lock before failing
    pub busy_timeout_ms: u64,
}

impl ConnectionDescriptor {
    pub fn new(database: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }
}

impl Default for ConnectionDescriptor {
    fn default() -> Self {
        Self {
            database: PathBuf::from("sqllock.db"),
            max_connections: 8,
            connection_timeout_ms: 30_000,
            busy_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockManagerConfig {
    pub table_prefix: String,
    pub connection: ConnectionDescriptor,
}

impl Default for LockManagerConfig {
    fn default() -> Self {
        Self {
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
            connection: ConnectionDescriptor::default(),
        }
    }
}

impl LockManagerConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Applies `SQLLOCK_DATABASE` and `SQLLOCK_TABLE_PREFIX` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup. Empty values are ignored.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(database) = lookup(ENV_DATABASE).filter(|v| !v.is_empty()) {
            self.connection.database = PathBuf::from(database);
        }
        if let Some(prefix) = lookup(ENV_TABLE_PREFIX).filter(|v| !v.is_empty()) {
            self.table_prefix = prefix;
        }
        self
    }
}
