//! Authentication error types.

use thiserror::Error;

use delivery_core::password::PasswordError;
use delivery_core::store::RepositoryError;
use delivery_core::validation::ValidationErrors;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials (wrong password, unknown email or no password set).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account was deactivated by the store.
    #[error("account is disabled")]
    AccountDisabled,

    /// Email or phone already belongs to another customer.
    #[error("{0}")]
    AlreadyRegistered(String),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Profile fields failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort => Self::WeakPassword(err.to_string()),
            PasswordError::Mismatch => Self::InvalidCredentials,
            PasswordError::Hash => Self::PasswordHash,
        }
    }
}
