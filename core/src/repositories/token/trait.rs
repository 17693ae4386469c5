//! Refresh token repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

/// Repository trait for RefreshToken entity persistence operations
///
/// # Security Considerations
/// - Only token hashes are stored, never raw token values
/// - Expired tokens should be periodically cleaned up
/// - Revocation must be visible to the next lookup
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new refresh token
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::Utc;
    /// # use uuid::Uuid;
    /// # use ec_core::repositories::TokenRepository;
    /// # use ec_core::domain::entities::token::RefreshToken;
    /// # async fn example(repo: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let user_id = Uuid::new_v4();
    /// let token = RefreshToken::new(user_id, "sha256_hex".to_string(), Uuid::new_v4(), Utc::now(), 3600);
    ///
    /// let saved = repo.save_refresh_token(token).await?;
    /// println!("Token saved with ID: {}", saved.id);
    /// # Ok(())
    /// # }
    /// ```
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token by its hashed value
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// Mark one token revoked
    ///
    /// # Returns
    /// * `Ok(true)` - This call revoked it
    /// * `Ok(false)` - Unknown or already revoked
    async fn revoke_token(&self, token_hash: &str) -> Result<bool, DomainError>;

    /// Revoke every token in a rotation family, returning how many changed
    async fn revoke_token_family(&self, family_id: Uuid) -> Result<u64, DomainError>;

    /// Revoke every token of a user, returning how many changed
    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<u64, DomainError>;

    /// Number of unrevoked, unexpired tokens a user holds
    async fn count_active_tokens(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<u64, DomainError>;

    /// Remove tokens that expired before `now`, returning how many were removed
    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}
