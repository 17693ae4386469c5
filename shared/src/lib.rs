//! Shared utilities and common types for the e-commerce backend
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Input validation helpers
//! - Pagination and response wrappers

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, ConfigError, CorsConfig, DatabaseConfig, Environment,
    JwtConfig, LoggingConfig, PasswordConfig, RevocationBackend, ServerConfig, VerificationConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{HealthResponse, MessageResponse, PaginatedResponse, Pagination};
pub use utils::validation;
