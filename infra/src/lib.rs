//! # Infrastructure Layer
//!
//! Concrete implementations of the repository and delivery traits defined in
//! `ec_core`:
//!
//! - **Database**: SQLite repositories for users, refresh tokens, revoked
//!   access tokens and email verification codes, using SQLx
//! - **Cache**: Redis-backed revocation store shared by every instance
//! - **Email**: development email adapter that logs instead of sending
//!
//! ## Features
//!
//! - `redis-cache`: Enable the Redis revocation store (default)

use ec_core::errors::DomainError;

/// Database module - SQLite implementations using SQLx
pub mod database;

/// Cache module - Redis client and revocation store
#[cfg(feature = "redis-cache")]
pub mod cache;

/// Email delivery adapters
pub mod email;

pub use database::{
    DatabasePool, SqliteRevocationStore, SqliteTokenRepository, SqliteUserRepository,
    SqliteVerificationCodeRepository,
};
pub use email::LoggingEmailService;

#[cfg(feature = "redis-cache")]
pub use cache::{RedisClient, RedisRevocationStore};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failure
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis cache error
    #[cfg(feature = "redis-cache")]
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Email delivery error
    #[error("Email service error: {0}")]
    Email(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Database(e) => database::map_sqlx_error("database", e),
            #[cfg(feature = "redis-cache")]
            InfrastructureError::Cache(e) => cache::map_redis_error("cache", e),
            InfrastructureError::Config(message) => DomainError::Config { message },
            other => DomainError::internal(other.to_string()),
        }
    }
}
