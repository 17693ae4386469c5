//! Token service module
//!
//! Issues and verifies HS256 access tokens, issues opaque refresh tokens with
//! single-use rotation, and revokes either kind.

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::TokenServiceConfig;
pub use service::{hash_token, CleanupReport, RotatedRefreshToken, TokenService};
