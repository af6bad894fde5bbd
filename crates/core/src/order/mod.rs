//! Orders: the permanent record of what a customer bought.
//!
//! An order is created once by the ledger and afterwards only changes through
//! status transitions. Line items and the customer snapshot are frozen at
//! creation time; later menu or profile edits never reach back into them.

mod number;
pub mod query;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use number::{OrderNumber, OrderNumberError};
pub use query::{
    DashboardStats, DashboardWindow, OrderPage, OrderQuery, OrderSort, OrderStats, SortDirection,
    StatusCount, TopItem,
};

use crate::customer::Customer;
use crate::ledger::totals::Totals;
use crate::menu::MenuItem;
use crate::types::{Address, CustomerId, Email, MenuItemId, Money, OrderId, OrderStatus, PaymentMethod, Phone};

/// Default delivery estimate shown to the customer.
pub const DEFAULT_ESTIMATED_MINUTES: u32 = 45;
/// Maximum length of an order note.
pub const NOTE_MAX: usize = 500;
/// Maximum length of a line-item note.
pub const ITEM_NOTE_MAX: usize = 200;

/// One menu item in an order, with the price it was sold at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub menu_item_id: MenuItemId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub subtotal: Money,
}

impl LineItem {
    /// Freezes the catalog's current name and price.
    #[must_use]
    pub fn from_menu_item(item: &MenuItem, quantity: u32, note: Option<String>) -> Self {
        Self {
            menu_item_id: item.id,
            name: item.name.clone(),
            unit_price: item.price,
            quantity,
            note,
            subtotal: item.price * quantity,
        }
    }
}

/// The customer's contact and address as they were when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSnapshot {
    pub customer_id: CustomerId,
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub address: Address,
}

impl From<&Customer> for CustomerSnapshot {
    fn from(customer: &Customer) -> Self {
        Self {
            customer_id: customer.id,
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            address: customer.address.clone(),
        }
    }
}

/// One entry of the append-only status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: OrderStatus,
    pub at: DateTime<Utc>,
    pub note: String,
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub number: OrderNumber,
    pub customer: CustomerSnapshot,
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub discount: Money,
    pub total: Money,
    pub status: OrderStatus,
    pub history: Vec<StatusEntry>,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub estimated_minutes: u32,
    pub placed_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub whatsapp_sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_url: Option<String>,
    /// Bumped on every write; guards concurrent status updates.
    pub version: i32,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Applies a status change in memory.
    ///
    /// Always appends exactly one history entry, even when `status` equals
    /// the current one. `confirmed_at` and `delivered_at` are only set the
    /// first time their status is reached.
    pub fn record_transition(&mut self, status: OrderStatus, note: Option<String>, at: DateTime<Utc>) {
        let note = note
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("status changed to {status}"));

        self.status = status;
        self.history.push(StatusEntry { status, at, note });

        match status {
            OrderStatus::Confirmed if self.confirmed_at.is_none() => self.confirmed_at = Some(at),
            OrderStatus::Delivered if self.delivered_at.is_none() => self.delivered_at = Some(at),
            _ => {}
        }
        self.updated_at = at;
    }

    /// Customer-facing path of the tracking page.
    #[must_use]
    pub fn tracking_path(&self) -> String {
        format!("/acompanhar/{}", self.number)
    }
}

/// An order that passed validation but has no id or number yet.
///
/// Repositories turn it into an [`Order`] with [`NewOrder::into_order`]
/// after allocating both atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer: CustomerSnapshot,
    pub items: Vec<LineItem>,
    pub delivery_fee: Money,
    pub discount: Money,
    pub totals: Totals,
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
    pub estimated_minutes: u32,
    pub placed_at: DateTime<Utc>,
}

impl NewOrder {
    /// The single history entry every order starts with.
    #[must_use]
    pub fn initial_entry(&self) -> StatusEntry {
        StatusEntry {
            status: OrderStatus::Pending,
            at: self.placed_at,
            note: "order placed".to_owned(),
        }
    }

    /// Completes the order with its allocated identifiers.
    #[must_use]
    pub fn into_order(self, id: OrderId, number: OrderNumber) -> Order {
        let history = vec![self.initial_entry()];
        Order {
            id,
            number,
            customer: self.customer,
            items: self.items,
            subtotal: self.totals.subtotal,
            delivery_fee: self.delivery_fee,
            discount: self.discount,
            total: self.totals.total,
            status: OrderStatus::Pending,
            history,
            payment_method: self.payment_method,
            note: self.note,
            estimated_minutes: self.estimated_minutes,
            placed_at: self.placed_at,
            confirmed_at: None,
            delivered_at: None,
            whatsapp_sent: false,
            whatsapp_url: None,
            version: 1,
            updated_at: self.placed_at,
        }
    }
}
