//! Authentication route handlers.
//!
//! Customer registration and login for the SPA. The session cookie carries
//! the login; handlers read it through `RequireAuth` / `OptionalAuth`.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;

use delivery_core::customer::{Customer, CustomerProfileInput};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, clear_current_customer, set_current_customer};
use crate::models::CurrentCustomer;
use crate::services::AuthService;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub profile: CustomerProfileInput,
    pub password: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a customer with a password and log them in.
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Customer>)> {
    let auth = AuthService::new(state.stores().customers.as_ref());
    let customer = auth.register_with_password(&body.profile, &body.password).await?;

    start_session(&session, &customer).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// Log in with email and password.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<CurrentCustomer>> {
    let auth = AuthService::new(state.stores().customers.as_ref());

    let customer = match auth.login_with_password(&body.email, &body.password).await {
        Ok(customer) => customer,
        Err(e) => {
            tracing::warn!(error = %e, "Customer login failed");
            return Err(e.into());
        }
    };

    let current = start_session(&session, &customer).await?;
    tracing::info!(customer_id = %customer.id, "Customer logged in");
    Ok(Json(current))
}

/// Log out.
///
/// POST /api/auth/logout
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_customer(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in customer, if any.
///
/// GET /api/auth/me
pub async fn me(OptionalAuth(customer): OptionalAuth) -> Result<Json<CurrentCustomer>> {
    customer
        .map(Json)
        .ok_or_else(|| AppError::Unauthorized("not logged in".to_string()))
}

async fn start_session(session: &Session, customer: &Customer) -> Result<CurrentCustomer> {
    let current = CurrentCustomer::from(customer);
    set_current_customer(session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&customer.id, Some(customer.email.as_str()));
    Ok(current)
}
