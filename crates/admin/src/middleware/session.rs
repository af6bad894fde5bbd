//! Session middleware configuration for admin.
//!
//! `PostgreSQL`-backed sessions with stricter settings than the storefront
//! (SameSite=Strict, 24hr expiry).

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "delivery_admin_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// Shares the `tower_sessions.session` table with the storefront; the
/// cookie names keep the two apart.
#[must_use]
pub fn create_session_layer(pool: &PgPool, config: &AdminConfig) -> SessionManagerLayer<PostgresStore> {
    let store = PostgresStore::new(pool.clone());
    let is_secure = config.base_url.starts_with("https://");
    session_layer(store, is_secure)
}

/// Apply the admin cookie settings to any session store.
#[must_use]
pub fn session_layer<S: SessionStore>(store: S, secure: bool) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        // SameSite=Strict for admin (stricter than storefront's Lax)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
