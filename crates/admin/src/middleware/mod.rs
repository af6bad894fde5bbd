//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS (allow-listed back-office origins, with credentials)
//! 3. `TraceLayer` (request span with method, uri, status, latency)
//! 4. Request ID (record on the span, echo in the response)
//! 5. Session layer (tower-sessions with `PostgreSQL` store, SameSite=Strict)
//! 6. Rate limiting (governor) on login and first registration
//! 7. Auth guard (`RequireAdminAuth` on every other route)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::{RequireAdminAuth, clear_current_admin, set_current_admin};
pub use rate_limit::login_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::{create_session_layer, session_layer};
