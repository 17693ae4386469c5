//! SQLite implementation of the UserRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use uuid::Uuid;

use ec_core::domain::entities::user::{NewUser, User, UserRole, UserStatus, UserUpdate};
use ec_core::errors::{AuthError, DomainError};
use ec_core::repositories::UserRepository;

use super::{column, uuid_column};
use crate::database::errors::{is_unique_violation, map_sqlx_error};

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, role, status, \
     is_email_verified, created_at, updated_at, last_login_at";

/// SQLite implementation of UserRepository
///
/// Email uniqueness is enforced by the `users.email` unique index with
/// `COLLATE NOCASE`, so two concurrent registrations cannot both succeed.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &SqliteRow) -> Result<User, DomainError> {
        let role: String = column(row, "role")?;
        let status: String = column(row, "status")?;

        Ok(User {
            id: uuid_column(row, "id")?,
            email: column(row, "email")?,
            password_hash: column(row, "password_hash")?,
            first_name: column(row, "first_name")?,
            last_name: column(row, "last_name")?,
            role: role.parse::<UserRole>().map_err(DomainError::internal)?,
            status: status.parse::<UserStatus>().map_err(DomainError::internal)?,
            is_email_verified: column(row, "is_email_verified")?,
            created_at: column::<DateTime<Utc>>(row, "created_at")?,
            updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
            last_login_at: column::<Option<DateTime<Utc>>>(row, "last_login_at")?,
        })
    }

    fn map_write_error(context: &str, err: sqlx::Error) -> DomainError {
        if is_unique_violation(&err) {
            AuthError::EmailAlreadyExists.into()
        } else {
            map_sqlx_error(context, err)
        }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let user = User::from_new(Uuid::new_v4(), user, Utc::now());

        let query = r#"
            INSERT INTO users (
                id, email, password_hash, first_name, last_name, role, status,
                is_email_verified, created_at, updated_at, last_login_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.role.as_str())
            .bind(user.status.as_str())
            .bind(user.is_email_verified)
            .bind(user.created_at)
            .bind(user.updated_at)
            .bind(user.last_login_at)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_write_error("create_user", e))?;

        tracing::debug!(user_id = %user.id, "User row inserted");
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE email = ? COLLATE NOCASE", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_id", e))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn update(&self, id: Uuid, changes: UserUpdate) -> Result<User, DomainError> {
        // Single statement so a partial update never races another writer
        let query = format!(
            r#"
            UPDATE users SET
                email = COALESCE(?, email),
                password_hash = COALESCE(?, password_hash),
                first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name),
                role = COALESCE(?, role),
                status = COALESCE(?, status),
                is_email_verified = COALESCE(?, is_email_verified),
                last_login_at = COALESCE(?, last_login_at),
                updated_at = ?
            WHERE id = ?
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(changes.email)
            .bind(changes.password_hash)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.role.map(|role| role.as_str()))
            .bind(changes.status.map(|status| status.as_str()))
            .bind(changes.is_email_verified)
            .bind(changes.last_login_at)
            .bind(Utc::now())
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::map_write_error("update_user", e))?
            .ok_or_else(|| DomainError::not_found("User"))?;

        Self::row_to_user(&row)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        // Refresh tokens and verification codes go with the row (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("User"));
        }
        Ok(())
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<User>, DomainError> {
        let query = format!(
            "SELECT {} FROM users ORDER BY created_at ASC, id ASC LIMIT ? OFFSET ?",
            USER_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;

        rows.iter().map(Self::row_to_user).collect()
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_users", e))?;

        Ok(count.max(0) as u64)
    }
}
