/// Password Hashing and Verification
///
/// bcrypt with a random salt per call and the library's default cost.
/// Input rules (length) are enforced by `validators::is_valid_password`
/// before anything reaches this module.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `Hashing` only if bcrypt itself fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST).map_err(|e| AppError::Hashing(e.to_string()))
}

/// Verify a password against its hash
///
/// A mismatch is `Ok(false)`; only a malformed stored hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash).map_err(|e| AppError::Hashing(e.to_string()))
}
