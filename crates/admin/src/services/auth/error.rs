//! Admin authentication error types.

use thiserror::Error;

use delivery_core::password::PasswordError;
use delivery_core::store::RepositoryError;
use delivery_core::validation::ValidationErrors;

/// Errors that can occur during admin authentication operations.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The admin account was deactivated.
    #[error("admin account is disabled")]
    AccountDisabled,

    /// Admin user already exists.
    #[error("admin user already exists")]
    UserAlreadyExists,

    /// Self-service registration is closed once any admin exists.
    #[error("registration is closed")]
    RegistrationClosed,

    #[error("password validation failed: {0}")]
    WeakPassword(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("password hashing error")]
    PasswordHash,
}

impl From<PasswordError> for AdminAuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort => Self::WeakPassword(err.to_string()),
            PasswordError::Mismatch => Self::InvalidCredentials,
            PasswordError::Hash => Self::PasswordHash,
        }
    }
}
