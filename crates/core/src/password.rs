//! Password hashing for customer and admin accounts.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,
    #[error("failed to hash password")]
    Hash,
    #[error("password does not match")]
    Mismatch,
}

/// Check a candidate password before hashing it.
///
/// # Errors
///
/// Returns `PasswordError::TooShort` below [`MIN_PASSWORD_LENGTH`].
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    Ok(())
}

/// Hash a password into a PHC string.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if argon2 fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::Hash)
}

/// Verify a password against a stored PHC string.
///
/// A malformed stored hash counts as a mismatch.
///
/// # Errors
///
/// Returns `PasswordError::Mismatch` if the password is wrong.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::Mismatch)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| PasswordError::Mismatch)
}
