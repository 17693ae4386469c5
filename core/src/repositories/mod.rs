pub mod revocation;
pub mod token;
pub mod user;
pub mod verification;

pub use revocation::{InMemoryRevocationStore, RevocationStore};
pub use token::TokenRepository;
pub use user::UserRepository;
pub use verification::VerificationCodeRepository;

#[cfg(any(test, feature = "test-util"))]
pub use token::MockTokenRepository;
#[cfg(any(test, feature = "test-util"))]
pub use user::MockUserRepository;
#[cfg(any(test, feature = "test-util"))]
pub use verification::MockVerificationCodeRepository;
