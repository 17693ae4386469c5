//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, TokenError};

use std::collections::BTreeMap;
use thiserror::Error;

/// Field name to the list of problems found with it
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid input: {} field(s) rejected", fields.len())]
    InvalidInput { fields: FieldErrors },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Timeout or connection failure talking to a store. Safe to retry.
    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Whether repeating the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::StoreUnavailable { .. })
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        DomainError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        DomainError::StoreUnavailable {
            message: message.into(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
