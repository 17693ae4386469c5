//! Validated, normalized email address.

use ec_shared::validation::{is_valid_email, normalize_email};

use crate::errors::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Trims and lowercases `raw`, then checks the format
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        let normalized = normalize_email(raw);
        if is_valid_email(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(AuthError::InvalidEmail)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
