//! Revocation set stored as Redis keys with a TTL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use ec_core::errors::DomainError;
use ec_core::repositories::RevocationStore;

use super::map_redis_error;
use super::redis_client::RedisClient;

/// One key per revoked `jti`, expiring together with the token
#[derive(Clone)]
pub struct RedisRevocationStore {
    client: RedisClient,
}

impl RedisRevocationStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn revoked_key(&self, jti: &str) -> String {
        self.client.key(&["revoked", jti])
    }
}

/// Whole seconds until `expires_at`, rounded up
pub(crate) fn ttl_seconds(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<u64> {
    let millis = (expires_at - now).num_milliseconds();
    if millis <= 0 {
        return None;
    }
    Some(((millis + 999) / 1000) as u64)
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        let Some(ttl) = ttl_seconds(expires_at, Utc::now()) else {
            return Ok(());
        };

        self.client
            .set_with_expiry(&self.revoked_key(jti), "1", ttl)
            .await
            .map_err(|e| map_redis_error("revoke_access_token", e))
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, DomainError> {
        self.client
            .exists(&self.revoked_key(jti))
            .await
            .map_err(|e| map_redis_error("is_token_revoked", e))
    }

    async fn purge_expired(&self) -> Result<u64, DomainError> {
        // Redis drops expired keys itself
        Ok(0)
    }
}
