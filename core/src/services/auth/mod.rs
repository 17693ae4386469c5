//! Authentication service module
//!
//! Registration, login, refresh token rotation, logout, password change and
//! email verification, plus the profile and admin user operations.

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use service::AuthService;
