//! Result of a successful login.

use crate::domain::entities::{TokenPair, User};

/// Issued tokens plus the authenticated user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub tokens: TokenPair,
    pub user: User,
}

impl AuthResponse {
    pub fn new(tokens: TokenPair, user: User) -> Self {
        Self { tokens, user }
    }

    /// Access token lifetime in seconds
    pub fn expires_in(&self) -> i64 {
        self.tokens.access_expires_in
    }
}
