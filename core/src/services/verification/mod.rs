//! Email verification module
//!
//! Issues 6-digit codes, delivers them through an `EmailServiceTrait`
//! implementation and checks submitted codes with a bounded number of
//! attempts.

mod config;
#[cfg(any(test, feature = "test-util"))]
mod mock;
mod service;
mod traits;
mod types;


pub use config::VerificationServiceConfig;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockEmailService;
pub use service::VerificationService;
pub use traits::EmailServiceTrait;
pub use types::SendCodeResult;
