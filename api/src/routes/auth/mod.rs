//! Authentication route handlers
//!
//! This module contains all `/auth` endpoints:
//! - Registration, login, token refresh and logout
//! - Profile and password change for the signed-in user
//! - Email verification
//! - User administration (admin role)

use std::sync::Arc;

use ec_core::repositories::{
    RevocationStore, TokenRepository, UserRepository, VerificationCodeRepository,
};
use ec_core::services::{AuthService, EmailServiceTrait};

pub mod change_password;
pub mod login;
pub mod logout;
pub mod me;
pub mod refresh;
pub mod register;
pub mod resend_verification;
pub mod users;
pub mod verify_email;

/// Application state shared by every handler
pub struct AppState<U, T, R, V, E>
where
    U: UserRepository,
    T: TokenRepository,
    R: RevocationStore,
    V: VerificationCodeRepository,
    E: EmailServiceTrait,
{
    pub auth_service: Arc<AuthService<U, T, R, V, E>>,
}

impl<U, T, R, V, E> AppState<U, T, R, V, E>
where
    U: UserRepository,
    T: TokenRepository,
    R: RevocationStore,
    V: VerificationCodeRepository,
    E: EmailServiceTrait,
{
    pub fn new(auth_service: Arc<AuthService<U, T, R, V, E>>) -> Self {
        Self { auth_service }
    }
}
