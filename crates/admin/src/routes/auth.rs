//! Authentication route handlers for admin.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;

use delivery_core::admin::AdminUser;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdminAuth, clear_current_admin, login_rate_limiter, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::AdminAuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .layer(login_rate_limiter())
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<CurrentAdmin>> {
    let auth = AdminAuthService::new(state.stores().admins.as_ref());
    let admin = auth.login(&body.email, &body.password).await.inspect_err(|e| {
        tracing::warn!(error = %e, "Admin login failed");
    })?;

    let current = start_session(&session, &admin).await?;
    tracing::info!(admin_id = %admin.id, "Admin logged in");
    Ok(Json(current))
}

/// Create the first admin and log them in.
///
/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AdminUser>)> {
    let auth = AdminAuthService::new(state.stores().admins.as_ref());
    let admin = auth.register_first(&body.name, &body.email, &body.password).await?;

    start_session(&session, &admin).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

/// POST /api/auth/logout
async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_admin(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> Json<CurrentAdmin> {
    Json(admin)
}

async fn start_session(session: &Session, admin: &AdminUser) -> Result<CurrentAdmin> {
    let current = CurrentAdmin::from(admin);
    set_current_admin(session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&current.id, Some(current.email.as_str()));
    Ok(current)
}
