//! Common validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum email length (RFC 5321 path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Person name length bounds, in characters
pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 50;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is valid")
});

// Letters of any script, spaces and hyphens
static NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L} \-]+$").expect("name pattern is valid"));

/// Trim and lowercase an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check an email address against the accepted format
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}

/// Check a first or last name. Expects an already trimmed value.
pub fn is_valid_person_name(name: &str) -> bool {
    let length = name.chars().count();
    (MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&length) && NAME_REGEX.is_match(name)
}

/// Mask an email for logs: `ann.lee@example.com` -> `a***@example.com`
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        None => String::from("***"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("a@x.c"));
        assert!(!is_valid_email(&format!("{}@x.com", "a".repeat(MAX_EMAIL_LENGTH))));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ann@Example.COM "), "ann@example.com");
    }

    #[test]
    fn test_person_name_rules() {
        assert!(is_valid_person_name("Ann"));
        assert!(is_valid_person_name("Mary-Jane"));
        assert!(is_valid_person_name("José María"));
        assert!(!is_valid_person_name("A"));
        assert!(!is_valid_person_name("R2D2"));
        assert!(!is_valid_person_name(&"a".repeat(MAX_NAME_LENGTH + 1)));
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("ann@example.com"), "a***@example.com");
        assert_eq!(mask_email("garbage"), "***");
    }
}
