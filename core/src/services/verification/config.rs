//! Configuration for the verification service

use ec_shared::config::VerificationConfig;

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Number of minutes before a verification code expires
    pub code_expiration_minutes: i64,
    /// Failed attempts allowed before the code is discarded
    pub max_attempts: u32,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self::from(&VerificationConfig::default())
    }
}

impl From<&VerificationConfig> for VerificationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            code_expiration_minutes: config.code_ttl_minutes,
            max_attempts: config.max_attempts,
        }
    }
}
