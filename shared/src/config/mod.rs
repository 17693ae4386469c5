//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - JWT, password hashing, email verification and revocation backend
//! - `cache` - Redis configuration
//! - `database` - Database connection, pool, timeout and retry configuration
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server and CORS configuration

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;
pub mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{
    AuthConfig, JwtConfig, PasswordConfig, RevocationBackend, VerificationConfig,
    MIN_BCRYPT_COST,
};
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::{CorsConfig, ServerConfig};

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Redis configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load `.env` (if present) and build the configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(ConfigError::Invalid {
                    key: ".env",
                    reason: err.to_string(),
                });
            }
        }

        let environment = Environment::from_env();
        let config = Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(environment)?,
            cache: CacheConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the service must not start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.validate(self.environment)?;

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DATABASE_MAX_CONNECTIONS",
                reason: "must be at least 1".into(),
            });
        }
        if self.database.max_retries == 0 {
            return Err(ConfigError::Invalid {
                key: "DATABASE_MAX_RETRIES",
                reason: "must be at least 1".into(),
            });
        }
        if self.environment.is_production() && self.server.cors.allowed_origins.is_empty() {
            tracing::warn!("ALLOWED_ORIGINS is empty in production, cross-origin requests will be rejected");
        }
        Ok(())
    }
}

/// Parse an environment variable, falling back to `default` when unset or malformed
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
