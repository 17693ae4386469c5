//! Revocation set for access tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::errors::DomainError;

/// Shared set of revoked access-token identifiers (`jti`).
///
/// Every service instance must see the same set, so production
/// implementations live in Redis or the database. Entries carry the token's
/// own expiry and may be dropped once it passes.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Add `jti` until `expires_at`. Revoking twice is not an error.
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError>;

    /// Whether `jti` is currently revoked
    async fn is_revoked(&self, jti: &str) -> Result<bool, DomainError>;

    /// Drop entries whose expiry has passed, returning how many were removed
    async fn purge_expired(&self) -> Result<u64, DomainError>;
}

/// Lets the backend be picked at runtime as `Arc<dyn RevocationStore>`
#[async_trait]
impl<S: RevocationStore + ?Sized> RevocationStore for Arc<S> {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        (**self).revoke(jti, expires_at).await
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, DomainError> {
        (**self).is_revoked(jti).await
    }

    async fn purge_expired(&self) -> Result<u64, DomainError> {
        (**self).purge_expired().await
    }
}
