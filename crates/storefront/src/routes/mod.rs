//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Menu
//! GET  /api/menu                      - Menu listing (category, available, search)
//! GET  /api/menu/categories           - Categories in use
//! GET  /api/menu/{id}                 - Menu item detail
//!
//! # Customers
//! POST /api/customers                 - Register without a password
//!
//! # Auth (rate limited)
//! POST /api/auth/register             - Register with a password
//! POST /api/auth/login                - Login
//! POST /api/auth/logout               - Logout
//! GET  /api/auth/me                   - Current customer
//!
//! # Account (requires auth)
//! GET  /api/account                   - Profile
//! PUT  /api/account                   - Update profile
//! GET  /api/account/orders            - Order history
//!
//! # Orders
//! POST /api/orders                    - Checkout (rate limited)
//! GET  /api/orders/number/{number}    - Public order lookup
//!
//! # Tracking
//! GET  /api/tracking/{number}         - Tracking view
//! POST /api/tracking/search           - Find orders by phone or email
//! ```

pub mod account;
pub mod auth;
pub mod customers;
pub mod menu;
pub mod orders;
pub mod tracking;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the menu routes router.
pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(menu::index))
        .route("/categories", get(menu::categories))
        .route("/{id}", get(menu::show))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::show).put(account::update))
        .route("/orders", get(account::orders))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create))
        .layer(api_rate_limiter())
        .route("/number/{number}", get(orders::show_by_number))
}

/// Create the tracking routes router.
pub fn tracking_routes() -> Router<AppState> {
    Router::new()
        .route("/search", post(tracking::search))
        .layer(api_rate_limiter())
        .route("/{number}", get(tracking::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/menu", menu_routes())
        .route("/api/customers", post(customers::create))
        .nest("/api/auth", auth_routes())
        .nest("/api/account", account_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/tracking", tracking_routes())
}
