//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Customer password registration and login
//! - `checkout` - Resolves who is ordering, then hands off to the order ledger
//! - `menu` - Cached menu reads

pub mod auth;
pub mod checkout;
pub mod menu;

pub use auth::{AuthError, AuthService};
pub use checkout::{CheckoutCustomer, CheckoutRequest, CheckoutService};
pub use menu::MenuCatalog;
