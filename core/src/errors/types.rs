//! Error types for authentication and token operations
//!
//! Messages here are for logs. The presentation layer decides what a caller
//! gets to see, and collapses token failures into one generic response.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account suspended")]
    AccountSuspended,

    #[error("Account inactive")]
    AccountInactive,

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password does not meet requirements: {}", requirements.join(", "))]
    WeakPassword { requirements: Vec<String> },

    #[error("Current password is incorrect")]
    WrongCurrentPassword,

    #[error("Invalid verification code")]
    InvalidVerificationCode,

    #[error("Verification code expired")]
    VerificationCodeExpired,

    #[error("Too many verification attempts")]
    TooManyVerificationAttempts,

    #[error("Email already verified")]
    EmailAlreadyVerified,

    #[error("Insufficient permissions")]
    InsufficientPermissions,
}

/// Token-related errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, malformed, wrong issuer/audience or unknown refresh token
    #[error("Invalid token")]
    Invalid,

    #[error("Token expired")]
    Expired,

    #[error("Token revoked")]
    Revoked,

    /// Signature is fine but the `type` claim is not the one required
    #[error("Wrong token type")]
    WrongType,

    #[error("Token generation failed")]
    GenerationFailed,
}
