//! Delivery Core - domain model and order ledger.
//!
//! This crate holds everything the storefront, admin and CLI share:
//! - [`types`] - Newtype wrappers for IDs, money, contacts, addresses and statuses
//! - [`ledger`] - The [`OrderLedger`](ledger::OrderLedger): order creation,
//!   status transitions and derived totals
//! - [`store`] - Repository traits with in-memory and `PostgreSQL` implementations
//! - [`notify`] - WhatsApp deep links for new orders and status changes
//! - [`tracking`] - Public tracking views
//!
//! # Features
//!
//! - `postgres` - `sqlx` encodings for the domain types and the `PostgreSQL`
//!   repositories

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod customer;
pub mod ledger;
pub mod menu;
pub mod notify;
pub mod order;
pub mod password;
pub mod store;
pub mod tracking;
pub mod types;
pub mod validation;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod fixtures;

pub use types::*;
