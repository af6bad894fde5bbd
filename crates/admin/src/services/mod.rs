//! Business logic services for admin.
//!
//! - `auth` - Email and password authentication for staff

pub mod auth;

pub use auth::{AdminAuthError, AdminAuthService};
