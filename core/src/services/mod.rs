//! Business services containing domain logic and use cases.

pub mod auth;
pub mod password;
pub mod retry;
pub mod token;
pub mod verification;

// Re-export commonly used types
pub use auth::{AuthService, AuthServiceConfig};
pub use password::PasswordService;
pub use retry::RetryPolicy;
pub use token::{CleanupReport, RotatedRefreshToken, TokenService, TokenServiceConfig};
pub use verification::{
    EmailServiceTrait, SendCodeResult, VerificationService, VerificationServiceConfig,
};

#[cfg(any(test, feature = "test-util"))]
pub use verification::MockEmailService;
