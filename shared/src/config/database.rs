//! Database configuration module

use serde::{Deserialize, Serialize};

/// Database configuration for the SQLite user and token store
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of idle connections kept open
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub connect_timeout: u64,

    /// Upper bound for a single store operation in milliseconds
    pub operation_timeout_ms: u64,

    /// Attempts made for an operation that failed with a transient error
    pub max_retries: u32,

    /// Initial backoff between retries in milliseconds
    pub retry_backoff_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::from("sqlite://data/ecommerce.db?mode=rwc"),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: 30,
            operation_timeout_ms: 5000,
            max_retries: 3,
            retry_backoff_ms: 50,
        }
    }
}

impl DatabaseConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("DATABASE_URL").unwrap_or(defaults.url),
            max_connections: super::env_or("DATABASE_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: super::env_or("DATABASE_MIN_CONNECTIONS", defaults.min_connections),
            connect_timeout: super::env_or("DATABASE_CONNECT_TIMEOUT", defaults.connect_timeout),
            operation_timeout_ms: super::env_or(
                "DATABASE_OPERATION_TIMEOUT_MS",
                defaults.operation_timeout_ms,
            ),
            max_retries: super::env_or("DATABASE_MAX_RETRIES", defaults.max_retries),
            retry_backoff_ms: super::env_or("DATABASE_RETRY_BACKOFF_MS", defaults.retry_backoff_ms),
        }
    }

    /// Create a new database configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// In-memory database, one connection so every query sees the same data
    pub fn in_memory() -> Self {
        Self {
            url: String::from("sqlite::memory:"),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        }
    }

    /// Set the maximum number of connections
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the per-operation timeout
    pub fn with_operation_timeout_ms(mut self, millis: u64) -> Self {
        self.operation_timeout_ms = millis;
        self
    }

    /// Whether the URL points at an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}
