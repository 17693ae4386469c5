//! Email "delivery" that only writes to the log.
//!
//! Used in development and anywhere no mail provider is configured. The code
//! itself is only logged at debug level.

use async_trait::async_trait;
use tracing::{debug, info};

use ec_core::services::verification::EmailServiceTrait;
use ec_shared::validation::mask_email;

#[derive(Debug, Clone, Default)]
pub struct LoggingEmailService {
    sender: String,
}

impl LoggingEmailService {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }
}

#[async_trait]
impl EmailServiceTrait for LoggingEmailService {
    async fn send_verification_code(&self, email: &str, code: &str) -> Result<(), String> {
        if email.trim().is_empty() {
            return Err("recipient address is empty".to_string());
        }

        info!(
            to = %mask_email(email),
            from = %self.sender,
            "Verification email queued"
        );
        debug!(to = %email, code = %code, "Verification code");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_delivery_succeeds() {
        let service = LoggingEmailService::new("no-reply@shop.example");

        service
            .send_verification_code("ann@example.com", "123456")
            .await
            .unwrap();
        assert_eq!(service.sender(), "no-reply@shop.example");
    }

    #[tokio::test]
    async fn test_empty_recipient_rejected() {
        let service = LoggingEmailService::default();
        assert!(service.send_verification_code("  ", "123456").await.is_err());
    }
}
