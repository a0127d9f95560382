//! Database configuration.

use serde::{Deserialize, Serialize};

/// Connection URL of a private, process-local database.
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL.
    #[serde(default = "default_url")]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// How long a writer waits on a locked database before giving up.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_seconds: u64,
}

impl DatabaseConfig {
    /// Configuration for a fresh in-memory database.
    pub fn in_memory() -> Self {
        Self {
            url: IN_MEMORY_URL.to_string(),
            ..Self::default()
        }
    }

    /// Whether the URL points at an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
            busy_timeout_seconds: default_busy_timeout(),
        }
    }
}

fn default_url() -> String {
    "sqlite://data/foldertree.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_busy_timeout() -> u64 {
    5
}
