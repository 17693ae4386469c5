pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;

pub use r#trait::TokenRepository;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockTokenRepository;
