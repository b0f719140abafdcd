/// Input validators for account and restaurant payloads
///
/// Rejects malformed input before it reaches the password hasher or the store.
/// Every rejection is a field-level `ValidationError` that is safe to return
/// to the caller verbatim.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MAX_LOCAL_PART_LENGTH: usize = 64;
const MAX_NAME_LENGTH: usize = 256;
const MIN_PASSWORD_LENGTH: usize = 6;
// bcrypt silently ignores everything past 72 bytes
const MAX_PASSWORD_LENGTH: usize = 72;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
    ).unwrap();
}

/// Validates an email address and returns it trimmed.
///
/// Case is preserved: uniqueness is enforced on the stored value as given.
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email", MIN_EMAIL_LENGTH));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    if has_suspicious_email_patterns(trimmed) {
        return Err(ValidationError::SuspiciousContent("email"));
    }

    Ok(trimmed.to_string())
}

/// Validates a display name (also used for restaurant names)
pub fn is_valid_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("name"));
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("name", MAX_NAME_LENGTH));
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent("name"));
    }

    Ok(trimmed.to_string())
}

/// Validates a plaintext password before hashing.
///
/// Only length is enforced. The password is not trimmed.
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password"));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("password", MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password", MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

fn has_suspicious_email_patterns(email: &str) -> bool {
    if let Some(at_pos) = email.find('@') {
        if email[..at_pos].len() > MAX_LOCAL_PART_LENGTH {
            return true;
        }
    }

    if email.matches('@').count() != 1 {
        return true;
    }

    email.contains('\0')
}
