//! Revocation set kept in the primary database.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use ec_core::clock::{Clock, SystemClock};
use ec_core::errors::DomainError;
use ec_core::repositories::RevocationStore;

use crate::database::errors::map_sqlx_error;

/// `revoked_tokens` table. Shared by every instance that uses the same
/// database file.
#[derive(Clone)]
pub struct SqliteRevocationStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteRevocationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl RevocationStore for SqliteRevocationStore {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        if expires_at <= self.clock.now() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, expires_at) VALUES (?, ?)
            ON CONFLICT (jti) DO UPDATE SET expires_at = MAX(expires_at, excluded.expires_at)
            "#,
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("revoke_access_token", e))?;

        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, DomainError> {
        let revoked: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE jti = ? AND expires_at > ?)",
        )
        .bind(jti)
        .bind(self.clock.now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("is_token_revoked", e))?;

        Ok(revoked)
    }

    async fn purge_expired(&self) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= ?")
            .bind(self.clock.now())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("purge_revoked_tokens", e))?;

        Ok(result.rows_affected())
    }
}
