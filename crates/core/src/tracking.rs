//! Customer-facing order tracking.
//!
//! Tracking views are public: anyone holding an order number can see them, so
//! they only carry the part of the address a courier would shout at the door.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::order::{LineItem, Order, OrderNumber, StatusEntry};
use crate::types::{Money, OrderStatus, PartialAddress, PaymentMethod};

/// Preparation budget, in minutes, the estimate counts down from.
const PREPARING_BUDGET_MINUTES: i64 = 30;
/// The countdown never promises less than this.
const PREPARING_FLOOR_MINUTES: i64 = 5;

/// Human-readable delivery estimate for an order at `now`.
#[must_use]
pub fn estimate(order: &Order, now: DateTime<Utc>) -> String {
    match order.status {
        OrderStatus::Pending => "Aguardando confirmação".to_owned(),
        OrderStatus::Confirmed => "Estimativa: 25-35 minutos".to_owned(),
        OrderStatus::Preparing => {
            let elapsed = (now - order.placed_at).num_minutes();
            let remaining = (PREPARING_BUDGET_MINUTES - elapsed).max(PREPARING_FLOOR_MINUTES);
            format!("Estimativa: {remaining} minutos")
        }
        OrderStatus::OutForDelivery => "Estimativa: 10-15 minutos".to_owned(),
        OrderStatus::Delivered => "Pedido entregue".to_owned(),
        OrderStatus::Cancelled => "Pedido cancelado".to_owned(),
        OrderStatus::Ready => "Aguardando atualização".to_owned(),
    }
}

/// One line on the tracking page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub subtotal: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<&LineItem> for TrackingItem {
    fn from(item: &LineItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            subtotal: item.subtotal,
            note: item.note.clone(),
        }
    }
}

/// Everything the public tracking page shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingView {
    pub number: OrderNumber,
    pub status: OrderStatus,
    pub status_label: &'static str,
    pub placed_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub estimate: String,
    pub items: Vec<TrackingItem>,
    pub address: PartialAddress,
    pub history: Vec<StatusEntry>,
    pub next_step: &'static str,
}

impl TrackingView {
    #[must_use]
    pub fn new(order: &Order, now: DateTime<Utc>) -> Self {
        Self {
            number: order.number,
            status: order.status,
            status_label: order.status.label(),
            placed_at: order.placed_at,
            confirmed_at: order.confirmed_at,
            delivered_at: order.delivered_at,
            total: order.total,
            payment_method: order.payment_method,
            estimate: estimate(order, now),
            items: order.items.iter().map(TrackingItem::from).collect(),
            address: order.customer.address.partial(),
            history: order.history.clone(),
            next_step: order.status.next_step(),
        }
    }
}

/// A search hit: enough to pick the right order and open its tracking page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub number: OrderNumber,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
    pub total: Money,
    pub tracking_url: String,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            number: order.number,
            status: order.status,
            placed_at: order.placed_at,
            total: order.total,
            tracking_url: order.tracking_path(),
        }
    }
}
