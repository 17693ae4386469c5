//! Pending email verification storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::verification_code::EmailVerification;
use crate::errors::DomainError;

/// One pending verification per user
#[async_trait]
pub trait VerificationCodeRepository: Send + Sync {
    /// Store `verification`, replacing any pending one for the same user
    async fn upsert(&self, verification: EmailVerification) -> Result<(), DomainError>;

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<EmailVerification>, DomainError>;

    /// Atomically use up one attempt while fewer than `max_attempts` have been made.
    ///
    /// Returns the new attempt count, or `None` when the limit is reached or
    /// no verification is pending.
    async fn claim_attempt(&self, user_id: Uuid, max_attempts: u32) -> Result<Option<u32>, DomainError>;

    /// Remove the pending verification. Missing is not an error.
    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<(), DomainError>;
}
