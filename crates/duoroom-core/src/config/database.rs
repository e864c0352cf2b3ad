//! Persistence configuration for rooms, history and file descriptors.

use serde::{Deserialize, Serialize};

/// Which backend holds rooms, history and the file index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseBackend {
    /// Process memory; everything is lost on restart.
    Memory,
    /// A SQLite database file; survives restarts.
    Sqlite,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Storage backend.
    #[serde(default = "default_backend")]
    pub backend: DatabaseBackend,
    /// SQLite connection URL (ignored by the memory backend).
    #[serde(default = "default_url")]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connection acquire timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_url(),
            max_connections: default_max_connections(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

fn default_backend() -> DatabaseBackend {
    DatabaseBackend::Sqlite
}

fn default_url() -> String {
    "sqlite://data/duoroom.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    10
}
