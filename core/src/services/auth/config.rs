//! Configuration for the authentication service

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// Whether to allow registration of new users
    pub allow_registration: bool,
    /// Whether to email a verification code right after registration
    pub send_verification_on_register: bool,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            allow_registration: true,
            send_verification_on_register: true,
        }
    }
}
