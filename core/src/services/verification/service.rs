//! Main verification service implementation

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use ec_shared::validation::mask_email;

use crate::clock::{Clock, SystemClock};
use crate::domain::entities::verification_code::EmailVerification;
use crate::errors::{AuthError, DomainResult};
use crate::repositories::VerificationCodeRepository;
use crate::services::retry::RetryPolicy;

use super::config::VerificationServiceConfig;
use super::traits::EmailServiceTrait;
use super::types::SendCodeResult;

/// Verification service for email verification codes
pub struct VerificationService<V: VerificationCodeRepository, E: EmailServiceTrait> {
    /// Pending codes, one per user
    repository: Arc<V>,
    /// Outbound email delivery
    email_service: Arc<E>,
    /// Service configuration
    config: VerificationServiceConfig,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
}

impl<V: VerificationCodeRepository, E: EmailServiceTrait> VerificationService<V, E> {
    /// Create a new verification service
    ///
    /// # Arguments
    ///
    /// * `repository` - Storage for pending codes
    /// * `email_service` - Email delivery implementation
    /// * `config` - Code lifetime and attempt limit
    pub fn new(repository: Arc<V>, email_service: Arc<E>, config: VerificationServiceConfig) -> Self {
        Self {
            repository,
            email_service,
            config,
            clock: Arc::new(SystemClock),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Issue a fresh code for `user_id` and email it to `email`
    ///
    /// Any earlier pending code is replaced. Delivery failures are logged and
    /// reported through `SendCodeResult::delivered`; only storage failures
    /// are errors.
    pub async fn send_code(&self, user_id: Uuid, email: &str) -> DomainResult<SendCodeResult> {
        let (verification, code) =
            EmailVerification::issue(user_id, self.clock.now(), self.config.code_expiration_minutes);
        let expires_at = verification.expires_at;

        self.retry
            .run("upsert_verification_code", || {
                self.repository.upsert(verification.clone())
            })
            .await?;

        let delivered = match self.email_service.send_verification_code(email, &code).await {
            Ok(()) => {
                info!(user_id = %user_id, email = %mask_email(email), "Verification code sent");
                true
            }
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    email = %mask_email(email),
                    error = %e,
                    "Failed to deliver verification code"
                );
                false
            }
        };

        Ok(SendCodeResult {
            expires_at,
            delivered,
        })
    }

    /// Check a submitted code
    ///
    /// Every submission uses up one attempt before the code is compared, so
    /// concurrent guesses cannot exceed the limit. A correct code consumes
    /// the pending verification. Once the attempts are used up the
    /// submission fails with `TooManyVerificationAttempts` and the code is
    /// discarded. An expired code is discarded too.
    pub async fn verify_code(&self, user_id: Uuid, code: &str) -> DomainResult<()> {
        let verification = self
            .retry
            .run("find_verification_code", || {
                self.repository.find_by_user_id(user_id)
            })
            .await?
            .ok_or(AuthError::InvalidVerificationCode)?;

        if verification.is_expired_at(self.clock.now()) {
            return self.reject(user_id, AuthError::VerificationCodeExpired).await;
        }

        let max_attempts = self.config.max_attempts;
        let claimed = self
            .retry
            .run("claim_verification_attempt", || {
                self.repository.claim_attempt(user_id, max_attempts)
            })
            .await?;

        let attempts = match claimed {
            Some(attempts) => attempts,
            None => return self.reject(user_id, AuthError::TooManyVerificationAttempts).await,
        };

        if !verification.matches(code) {
            debug!(user_id = %user_id, attempts, max_attempts, "Wrong verification code");
            return Err(AuthError::InvalidVerificationCode.into());
        }

        self.discard(user_id).await?;
        info!(user_id = %user_id, "Verification code accepted");
        Ok(())
    }

    async fn reject(&self, user_id: Uuid, reason: AuthError) -> DomainResult<()> {
        self.discard(user_id).await?;
        warn!(user_id = %user_id, reason = %reason, "Verification code discarded");
        Err(reason.into())
    }

    /// Remove any pending code for the user
    pub async fn discard(&self, user_id: Uuid) -> DomainResult<()> {
        self.retry
            .run("delete_verification_code", || {
                self.repository.delete_by_user_id(user_id)
            })
            .await
    }
}
