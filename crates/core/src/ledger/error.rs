//! Order ledger error types.

use core::fmt;

use thiserror::Error;

use crate::order::OrderNumber;
use crate::store::RepositoryError;
use crate::types::{CustomerId, MenuItemId, OrderId, OrderStatus};
use crate::validation::ValidationErrors;

/// The record a lookup failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Customer(CustomerId),
    MenuItem(MenuItemId),
    Order(OrderId),
    OrderNumber(OrderNumber),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer(id) => write!(f, "customer {id}"),
            Self::MenuItem(id) => write!(f, "menu item {id}"),
            Self::Order(id) => write!(f, "order {id}"),
            Self::OrderNumber(number) => write!(f, "order #{number}"),
        }
    }
}

/// Errors returned by [`OrderLedger`](super::OrderLedger) operations.
///
/// Every failure leaves the store untouched.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or missing input.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A referenced customer, menu item or order does not exist.
    #[error("{0} not found")]
    NotFound(Missing),

    /// A menu item exists but cannot be ordered right now.
    #[error("{name} is currently unavailable")]
    Unavailable {
        menu_item_id: MenuItemId,
        name: String,
    },

    /// The configured transition policy forbids this status change.
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// A concurrent write won; nothing was applied.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store failed.
    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for LedgerError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Repository(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = LedgerError::NotFound(Missing::Customer(CustomerId::new(3)));
        assert_eq!(err.to_string(), "customer 3 not found");

        let err = LedgerError::NotFound(Missing::OrderNumber(OrderNumber::new(12)));
        assert_eq!(err.to_string(), "order #000012 not found");

        let err = LedgerError::InvalidTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Pending,
        };
        assert_eq!(err.to_string(), "cannot move order from delivered to pending");
    }

    #[test]
    fn test_repository_conflict_becomes_ledger_conflict() {
        let err = LedgerError::from(RepositoryError::Conflict("stale version".to_string()));
        assert!(matches!(err, LedgerError::Conflict(_)));
        let err = LedgerError::from(RepositoryError::DataCorruption("bad row".to_string()));
        assert!(matches!(err, LedgerError::Repository(_)));
    }
}
