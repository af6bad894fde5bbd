//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST  /api/auth/login                - Login (rate limited)
//! POST  /api/auth/register             - Create the first admin (rate limited)
//! POST  /api/auth/logout               - Logout
//! GET   /api/auth/me                   - Current admin
//!
//! # Orders (requires auth)
//! GET   /api/orders                    - List (status, customerId, from, to, sort, direction, page, limit)
//! GET   /api/orders/pending            - Orders awaiting confirmation
//! GET   /api/orders/dashboard          - Today's figures and best sellers
//! GET   /api/orders/number/{number}    - Order by number
//! GET   /api/orders/{id}               - Order by id
//! PATCH /api/orders/{id}/status        - Change status
//! POST  /api/orders/{id}/whatsapp      - Re-issue the store WhatsApp link
//!
//! # Menu (requires auth)
//! GET   /api/menu                      - List
//! POST  /api/menu                      - Create
//! GET   /api/menu/{id}                 - Detail
//! PUT   /api/menu/{id}                 - Replace
//! DELETE /api/menu/{id}                - Delete
//! PATCH /api/menu/{id}/availability    - Toggle availability
//!
//! # Customers (requires auth)
//! GET   /api/customers                 - List (search, city, active, page, limit)
//! GET   /api/customers/{id}            - Detail
//! PUT   /api/customers/{id}            - Update profile
//! PATCH /api/customers/{id}/status     - Activate or deactivate
//! ```

pub mod auth;
pub mod customers;
pub mod menu;
pub mod orders;

use axum::Router;

use crate::state::AppState;

/// Create all routes for the admin API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(orders::router())
        .merge(menu::router())
        .merge(customers::router())
}
