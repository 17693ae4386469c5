//! # E-commerce Auth Core
//!
//! Domain layer for the authentication service: entities, value objects,
//! repository traits, the token, password, verification and authentication
//! services, and the error types they share.

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use clock::{Clock, SystemClock};
pub use domain::entities::{
    Claims, EmailVerification, NewUser, RefreshToken, TokenPair, TokenType, User, UserRole,
    UserStatus, UserUpdate,
};
pub use domain::value_objects::AuthResponse;
pub use errors::{AuthError, DomainError, DomainResult, FieldErrors, TokenError};
pub use repositories::{
    InMemoryRevocationStore, RevocationStore, TokenRepository, UserRepository,
    VerificationCodeRepository,
};
pub use services::{
    AuthService, AuthServiceConfig, EmailServiceTrait, PasswordService, RetryPolicy,
    SendCodeResult, TokenService, TokenServiceConfig, VerificationService,
    VerificationServiceConfig,
};

#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualClock;
#[cfg(any(test, feature = "test-util"))]
pub use repositories::{MockTokenRepository, MockUserRepository, MockVerificationCodeRepository};
#[cfg(any(test, feature = "test-util"))]
pub use services::MockEmailService;
