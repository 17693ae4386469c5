//! Domain entities representing core business objects.

pub mod token;
pub mod user;
pub mod verification_code;

pub use token::{
    Claims, RefreshToken, TokenPair, TokenType, DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
    DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
};
pub use user::{NewUser, User, UserRole, UserStatus, UserUpdate};
pub use verification_code::{EmailVerification, CODE_LENGTH};
