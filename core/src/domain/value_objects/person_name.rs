//! First and last name validation.

use ec_shared::validation::{is_valid_person_name, MAX_NAME_LENGTH, MIN_NAME_LENGTH};

/// Trimmed name of 2-50 letters, spaces or hyphens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    /// Parses a name, returning a caller-facing message on rejection
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if is_valid_person_name(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(format!(
                "must be {}-{} characters of letters, spaces or hyphens",
                MIN_NAME_LENGTH, MAX_NAME_LENGTH
            ))
        }
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
