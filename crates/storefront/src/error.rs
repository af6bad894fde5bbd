//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Responses are JSON: `{"error": "...", "fields": [...]}`, where `fields`
//! is only present for validation failures.

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

use crate::services::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order ledger rejected the operation.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Customer is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

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
    /// HTTP status for this error.
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
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::AccountDisabled => StatusCode::UNAUTHORIZED,
                AuthError::AlreadyRegistered(_) => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Server-side details are never exposed.
    fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            return "Internal server error".to_string();
        }

        match self {
            Self::Ledger(LedgerError::Validation(_)) | Self::Validation(_) | Self::Auth(AuthError::Validation(_)) => {
                "Validation failed".to_string()
            }
            Self::Ledger(err) => err.to_string(),
            Self::Database(RepositoryError::Conflict(message)) => message.clone(),
            Self::Database(_) => "Not found".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::AccountDisabled => "This account is disabled".to_string(),
                AuthError::AlreadyRegistered(message) => message.clone(),
                AuthError::WeakPassword(message) => message.clone(),
                _ => "Authentication error".to_string(),
            },
            Self::NotFound(message) | Self::Unauthorized(message) | Self::BadRequest(message) => message.clone(),
            _ => self.to_string(),
        }
    }

    fn fields(&self) -> &[FieldError] {
        match self {
            Self::Ledger(LedgerError::Validation(errors))
            | Self::Validation(errors)
            | Self::Auth(AuthError::Validation(errors)) => errors.fields(),
            _ => &[],
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
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

/// Set the Sentry user context from a customer ID.
///
/// Call this after successful authentication to associate errors with customers.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the customer.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for customer actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Order placed", Some(&[("number", "000042")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use delivery_core::ledger::Missing;
    use delivery_core::{MenuItemId, OrderId, OrderStatus};

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        let response = err.into_response();
        response.status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order 12".to_string());
        assert_eq!(err.to_string(), "Not found: order 12");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_ledger_error_status_codes() {
        assert_eq!(
            get_status(LedgerError::NotFound(Missing::Order(OrderId::new(1))).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(
                LedgerError::Unavailable {
                    menu_item_id: MenuItemId::new(1),
                    name: "Pizza".to_string(),
                }
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(
                LedgerError::InvalidTransition {
                    from: OrderStatus::Delivered,
                    to: OrderStatus::Pending,
                }
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(LedgerError::Conflict("stale".to_string()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(LedgerError::Repository(RepositoryError::DataCorruption("x".to_string())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_fields_exposed() {
        let err = AppError::Validation(ValidationErrors::single("items", "must contain at least one item"));
        assert_eq!(err.fields().len(), 1);
        assert_eq!(err.public_message(), "Validation failed");
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption("bad row 7".to_string()));
        assert_eq!(err.public_message(), "Internal server error");
        assert!(err.fields().is_empty());
    }
}
