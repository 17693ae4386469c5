//! Database module - SQLite implementations using SQLx
//!
//! - Connection pool management and migrations
//! - Repository implementations for the core traits
//! - Mapping of driver errors onto domain errors

pub mod connection;
pub mod errors;
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use connection::DatabasePool;
pub use errors::map_sqlx_error;
pub use sqlite::{
    SqliteRevocationStore, SqliteTokenRepository, SqliteUserRepository,
    SqliteVerificationCodeRepository,
};
