//! Value objects representing immutable domain concepts.

pub mod auth_response;
pub mod email;
pub mod password_policy;
pub mod person_name;

pub use auth_response::AuthResponse;
pub use email::Email;
pub use password_policy::{check_password_strength, MAX_PASSWORD_BYTES, MIN_PASSWORD_LENGTH};
pub use person_name::PersonName;
