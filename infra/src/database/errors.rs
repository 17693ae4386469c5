//! Translation of SQLx errors into domain errors.

use ec_core::errors::DomainError;
use sqlx::error::DatabaseError;

/// SQLITE_BUSY and SQLITE_LOCKED primary result codes
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Map a driver error to a domain error.
///
/// Pool exhaustion, I/O failures and lock contention become
/// `StoreUnavailable` so the service layer can retry them. Constraint
/// violations are left to callers, which know what the constraint means.
pub fn map_sqlx_error(context: &str, err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            tracing::warn!(context, error = %err, "Database unavailable");
            DomainError::unavailable(format!("{}: {}", context, err))
        }
        sqlx::Error::Database(db) if is_busy(db.as_ref()) => {
            tracing::warn!(context, error = %err, "Database busy");
            DomainError::unavailable(format!("{}: {}", context, err))
        }
        _ => {
            tracing::error!(context, error = %err, "Database error");
            DomainError::internal(format!("{}: {}", context, err))
        }
    }
}

/// Whether the error is a unique constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Whether the error is a foreign key violation
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

fn is_busy(db: &dyn DatabaseError) -> bool {
    // Extended result codes keep the primary code in the low byte
    db.code()
        .and_then(|code| code.parse::<i32>().ok())
        .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false)
}
