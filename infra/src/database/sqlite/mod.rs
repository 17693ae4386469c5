//! SQLite implementations of the core repository traits.
//!
//! Identifiers are stored as hyphenated UUID text and timestamps as RFC 3339
//! text in UTC, so comparisons in SQL follow chronological order.

mod revocation_repository_impl;
mod token_repository_impl;
mod user_repository_impl;
mod verification_repository_impl;

pub use revocation_repository_impl::SqliteRevocationStore;
pub use token_repository_impl::SqliteTokenRepository;
pub use user_repository_impl::SqliteUserRepository;
pub use verification_repository_impl::SqliteVerificationCodeRepository;

use sqlx::sqlite::SqliteRow;
use sqlx::{Decode, Row, Sqlite, Type};
use uuid::Uuid;

use ec_core::errors::DomainError;

/// Read one column, reporting a decode failure as an internal error
fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, DomainError>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| DomainError::internal(format!("Failed to get {}: {}", name, e)))
}

fn uuid_column(row: &SqliteRow, name: &str) -> Result<Uuid, DomainError> {
    let raw: String = column(row, name)?;
    Uuid::parse_str(&raw)
        .map_err(|e| DomainError::internal(format!("Invalid UUID in {}: {}", name, e)))
}
