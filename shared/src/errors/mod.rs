//! Shared error response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Standard error response structure used across all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for client identification
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details (field errors, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Create an error response carrying field-level validation messages
    pub fn with_field_errors(
        error: impl Into<String>,
        message: impl Into<String>,
        fields: &BTreeMap<String, Vec<String>>,
    ) -> Self {
        let details = fields
            .iter()
            .map(|(field, messages)| (field.clone(), serde_json::json!(messages)))
            .collect();

        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
            timestamp: Utc::now(),
        }
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Error codes returned in `ErrorResponse::error`
pub mod error_codes {
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const ACCOUNT_SUSPENDED: &str = "ACCOUNT_SUSPENDED";
    pub const ACCOUNT_INACTIVE: &str = "ACCOUNT_INACTIVE";
    pub const DUPLICATE_EMAIL: &str = "DUPLICATE_EMAIL";
    pub const INVALID_EMAIL: &str = "INVALID_EMAIL";
    pub const WEAK_PASSWORD: &str = "WEAK_PASSWORD";
    pub const WRONG_CURRENT_PASSWORD: &str = "WRONG_CURRENT_PASSWORD";
    pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";
    pub const INVALID_TOKEN: &str = "INVALID_TOKEN";
    pub const INVALID_CODE: &str = "INVALID_CODE";
    pub const EXPIRED_CODE: &str = "EXPIRED_CODE";
    pub const TOO_MANY_ATTEMPTS: &str = "TOO_MANY_ATTEMPTS";
    pub const ALREADY_VERIFIED: &str = "ALREADY_VERIFIED";
}
