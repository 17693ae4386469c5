//! SQLite implementation of the TokenRepository trait.
//!
//! Only SHA-256 hashes of refresh tokens reach the database. Revocation is a
//! conditional update, so exactly one of two concurrent rotations of the same
//! token observes `revoke_token == true`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use uuid::Uuid;

use ec_core::domain::entities::token::RefreshToken;
use ec_core::errors::DomainError;
use ec_core::repositories::TokenRepository;

use super::{column, uuid_column};
use crate::database::errors::{is_foreign_key_violation, is_unique_violation, map_sqlx_error};

#[derive(Clone)]
pub struct SqliteTokenRepository {
    pool: SqlitePool,
}

impl SqliteTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: &SqliteRow) -> Result<RefreshToken, DomainError> {
        Ok(RefreshToken {
            id: uuid_column(row, "id")?,
            user_id: uuid_column(row, "user_id")?,
            token_hash: column(row, "token_hash")?,
            family_id: uuid_column(row, "family_id")?,
            created_at: column::<DateTime<Utc>>(row, "created_at")?,
            expires_at: column::<DateTime<Utc>>(row, "expires_at")?,
            is_revoked: column(row, "is_revoked")?,
        })
    }
}

#[async_trait]
impl TokenRepository for SqliteTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, user_id, token_hash, family_id, created_at, expires_at, is_revoked
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.id.to_string())
            .bind(token.user_id.to_string())
            .bind(&token.token_hash)
            .bind(token.family_id.to_string())
            .bind(token.created_at)
            .bind(token.expires_at)
            .bind(token.is_revoked)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::Conflict {
                        message: "Refresh token already exists".to_string(),
                    }
                } else if is_foreign_key_violation(&e) {
                    DomainError::not_found("User")
                } else {
                    map_sqlx_error("save_refresh_token", e)
                }
            })?;

        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let query = r#"
            SELECT id, user_id, token_hash, family_id, created_at, expires_at, is_revoked
            FROM refresh_tokens
            WHERE token_hash = ?
        "#;

        let row = sqlx::query(query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_refresh_token", e))?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn revoke_token(&self, token_hash: &str) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = 1 WHERE token_hash = ? AND is_revoked = 0",
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("revoke_token", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke_token_family(&self, family_id: Uuid) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = 1 WHERE family_id = ? AND is_revoked = 0",
        )
        .bind(family_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("revoke_token_family", e))?;

        Ok(result.rows_affected())
    }

    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = 1 WHERE user_id = ? AND is_revoked = 0",
        )
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("revoke_all_user_tokens", e))?;

        Ok(result.rows_affected())
    }

    async fn count_active_tokens(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM refresh_tokens WHERE user_id = ? AND is_revoked = 0 AND expires_at > ?",
        )
        .bind(user_id.to_string())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_active_tokens", e))?;

        Ok(count.max(0) as u64)
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_expired_tokens", e))?;

        if result.rows_affected() > 0 {
            tracing::info!(removed = result.rows_affected(), "Expired refresh tokens removed");
        }
        Ok(result.rows_affected())
    }
}
