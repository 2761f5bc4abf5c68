//! Request field checks applied before anything reaches the identity core.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use keyward_core::normalize_key;

static USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9]{3,15}$").expect("username pattern is valid")
});

static PASSWORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ -~]{6,20}$").expect("password pattern is valid")
});

static ROLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z]{3,15}$").expect("role pattern is valid")
});

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("username must be 3-15 letters or digits")]
    Username,
    #[error("password must be 6-20 printable ASCII characters")]
    Password,
    #[error("role must be 3-15 letters")]
    Role,
}

/// Normalize and check a username.
pub fn username(raw: &str) -> Result<String, ValidationError> {
    let name = normalize_key(raw);
    if USERNAME_PATTERN.is_match(&name) {
        Ok(name)
    } else {
        Err(ValidationError::Username)
    }
}

/// Passwords are checked verbatim; they are never trimmed or lowercased.
pub fn password(raw: &str) -> Result<&str, ValidationError> {
    if PASSWORD_PATTERN.is_match(raw) {
        Ok(raw)
    } else {
        Err(ValidationError::Password)
    }
}

pub fn role(raw: &str) -> Result<String, ValidationError> {
    let name = normalize_key(raw);
    if ROLE_PATTERN.is_match(&name) {
        Ok(name)
    } else {
        Err(ValidationError::Role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_are_normalized_then_checked() {
        assert_eq!(username("  Alice01 ").unwrap(), "alice01");
        assert_eq!(username("ab"), Err(ValidationError::Username));
        assert_eq!(username("alice_bob"), Err(ValidationError::Username));
        assert_eq!(
            username("a".repeat(16).as_str()),
            Err(ValidationError::Username)
        );
    }

    #[test]
    fn passwords_allow_printable_ascii_only() {
        assert_eq!(password(" pass word ~").unwrap(), " pass word ~");
        assert_eq!(password("short"), Err(ValidationError::Password));
        assert_eq!(password("pässwörd"), Err(ValidationError::Password));
        assert_eq!(password("tab\tinside"), Err(ValidationError::Password));
    }

    #[test]
    fn roles_are_letters_only() {
        assert_eq!(role(" Admin ").unwrap(), "admin");
        assert_eq!(role("ops1"), Err(ValidationError::Role));
        assert_eq!(role("op"), Err(ValidationError::Role));
    }
}
