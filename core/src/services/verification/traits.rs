//! Traits for email delivery integration

use async_trait::async_trait;

/// Outbound email delivery
#[async_trait]
pub trait EmailServiceTrait: Send + Sync {
    /// Send a verification code to `email`
    async fn send_verification_code(&self, email: &str, code: &str) -> Result<(), String>;
}
