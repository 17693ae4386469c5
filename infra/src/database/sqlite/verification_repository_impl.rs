//! SQLite implementation of the VerificationCodeRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use uuid::Uuid;

use ec_core::domain::entities::verification_code::EmailVerification;
use ec_core::errors::DomainError;
use ec_core::repositories::VerificationCodeRepository;

use super::{column, uuid_column};
use crate::database::errors::{is_foreign_key_violation, map_sqlx_error};

/// One row per user in `email_verification_codes`, replaced on resend
#[derive(Clone)]
pub struct SqliteVerificationCodeRepository {
    pool: SqlitePool,
}

impl SqliteVerificationCodeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_verification(row: &SqliteRow) -> Result<EmailVerification, DomainError> {
        let attempts: i64 = column(row, "attempts")?;

        Ok(EmailVerification {
            id: uuid_column(row, "id")?,
            user_id: uuid_column(row, "user_id")?,
            code_hash: column(row, "code_hash")?,
            attempts: u32::try_from(attempts).unwrap_or(u32::MAX),
            created_at: column::<DateTime<Utc>>(row, "created_at")?,
            expires_at: column::<DateTime<Utc>>(row, "expires_at")?,
        })
    }
}

#[async_trait]
impl VerificationCodeRepository for SqliteVerificationCodeRepository {
    async fn upsert(&self, verification: EmailVerification) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO email_verification_codes (
                id, user_id, code_hash, attempts, created_at, expires_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                id = excluded.id,
                code_hash = excluded.code_hash,
                attempts = excluded.attempts,
                created_at = excluded.created_at,
                expires_at = excluded.expires_at
        "#;

        sqlx::query(query)
            .bind(verification.id.to_string())
            .bind(verification.user_id.to_string())
            .bind(&verification.code_hash)
            .bind(i64::from(verification.attempts))
            .bind(verification.created_at)
            .bind(verification.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    DomainError::not_found("User")
                } else {
                    map_sqlx_error("upsert_verification_code", e)
                }
            })?;

        Ok(())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<EmailVerification>, DomainError> {
        let query = r#"
            SELECT id, user_id, code_hash, attempts, created_at, expires_at
            FROM email_verification_codes
            WHERE user_id = ?
        "#;

        let row = sqlx::query(query)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_verification_code", e))?;

        row.as_ref().map(Self::row_to_verification).transpose()
    }

    async fn claim_attempt(&self, user_id: Uuid, max_attempts: u32) -> Result<Option<u32>, DomainError> {
        let query = r#"
            UPDATE email_verification_codes
            SET attempts = attempts + 1
            WHERE user_id = ? AND attempts < ?
            RETURNING attempts
        "#;

        let attempts: Option<i64> = sqlx::query_scalar(query)
            .bind(user_id.to_string())
            .bind(i64::from(max_attempts))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("claim_verification_attempt", e))?;

        Ok(attempts.map(|n| u32::try_from(n).unwrap_or(u32::MAX)))
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM email_verification_codes WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_verification_code", e))?;

        Ok(())
    }
}
