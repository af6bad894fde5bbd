//! Unified error handling for admin.
//!
//! Error bodies are JSON: `{"error": "...", "fields": [...]}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use delivery_core::ledger::LedgerError;
use delivery_core::store::RepositoryError;
use delivery_core::validation::{FieldError, ValidationErrors};

use crate::services::AdminAuthError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] AdminAuthError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "<[FieldError]>::is_empty")]
    fields: &'a [FieldError],
}

impl AppError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Ledger(err) => match err {
                LedgerError::Validation(_)
                | LedgerError::Unavailable { .. }
                | LedgerError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
                LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
                LedgerError::Conflict(_) => StatusCode::CONFLICT,
                LedgerError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Auth(err) => match err {
                AdminAuthError::InvalidCredentials | AdminAuthError::AccountDisabled => StatusCode::UNAUTHORIZED,
                AdminAuthError::RegistrationClosed => StatusCode::FORBIDDEN,
                AdminAuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AdminAuthError::WeakPassword(_) | AdminAuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AdminAuthError::Repository(_) | AdminAuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        // Don't expose internal error details to clients
        if self.status_code().is_server_error() {
            return "Internal server error".to_string();
        }

        match self {
            Self::Ledger(LedgerError::Validation(_))
            | Self::Validation(_)
            | Self::Auth(AdminAuthError::Validation(_)) => "Validation failed".to_string(),
            Self::Ledger(err) => err.to_string(),
            Self::Database(RepositoryError::Conflict(message)) => message.clone(),
            Self::Database(_) => "Not found".to_string(),
            Self::Auth(err) => err.to_string(),
            Self::NotFound(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::BadRequest(message)
            | Self::Internal(message) => message.clone(),
        }
    }

    fn fields(&self) -> &[FieldError] {
        match self {
            Self::Ledger(LedgerError::Validation(errors))
            | Self::Validation(errors)
            | Self::Auth(AdminAuthError::Validation(errors)) => errors.fields(),
            _ => &[],
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let body = ErrorBody {
            error: self.public_message(),
            fields: self.fields(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an admin user ID.
pub fn set_sentry_user(admin_user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use delivery_core::ledger::Missing;
    use delivery_core::{OrderId, OrderStatus};

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order 123".to_string());
        assert_eq!(err.to_string(), "Not found: order 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(get_status(AppError::NotFound("test".to_string())), StatusCode::NOT_FOUND);
        assert_eq!(get_status(AppError::Unauthorized("test".to_string())), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(AppError::Forbidden("test".to_string())), StatusCode::FORBIDDEN);
        assert_eq!(get_status(AppError::BadRequest("test".to_string())), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_ledger_and_auth_status_codes() {
        assert_eq!(
            get_status(LedgerError::NotFound(Missing::Order(OrderId::new(9))).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(
                LedgerError::InvalidTransition {
                    from: OrderStatus::Cancelled,
                    to: OrderStatus::Confirmed,
                }
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(LedgerError::Conflict("stale version".to_string()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(get_status(AdminAuthError::RegistrationClosed.into()), StatusCode::FORBIDDEN);
        assert_eq!(get_status(AdminAuthError::InvalidCredentials.into()), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Internal("session store down".to_string());
        assert_eq!(err.public_message(), "Internal server error");
    }
}
