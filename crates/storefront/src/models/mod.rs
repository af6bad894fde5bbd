//! Session models for storefront.

pub mod session;

pub use session::{CurrentCustomer, keys as session_keys};
