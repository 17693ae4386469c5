//! Password strength rules applied on registration and password change.

use crate::errors::AuthError;

/// Minimum password length in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// bcrypt ignores input past 72 bytes, so longer passwords are refused
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Returns every unmet requirement, or `Ok` for an acceptable password
pub fn check_password_strength(password: &str) -> Result<(), AuthError> {
    let mut requirements = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        requirements.push(format!("at least {} characters", MIN_PASSWORD_LENGTH));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        requirements.push(format!("at most {} bytes", MAX_PASSWORD_BYTES));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        requirements.push("an uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        requirements.push("a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        requirements.push("a digit".to_string());
    }
    if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        requirements.push("a special character".to_string());
    }

    if requirements.is_empty() {
        Ok(())
    } else {
        Err(AuthError::WeakPassword { requirements })
    }
}
