//! Checkout and public order lookup.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use delivery_core::notify::Notification;
use delivery_core::order::{LineItem, Order, OrderNumber};
use delivery_core::{Money, OrderStatus, PaymentMethod};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::OptionalAuth;
use crate::services::{CheckoutRequest, CheckoutService};
use crate::state::AppState;

/// Response of a successful checkout.
///
/// Carries the public view of the order, so an anonymous caller never
/// receives stored contact details.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order: PublicOrder,
    /// Link that sends the order to the store over WhatsApp.
    pub whatsapp: Notification,
    pub tracking_url: String,
}

/// An order as anyone holding its number may see it.
///
/// Contact details and the delivery address are left out.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicOrder {
    pub number: OrderNumber,
    pub customer_name: String,
    pub status: OrderStatus,
    pub status_label: &'static str,
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub discount: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub estimated_minutes: u32,
    pub placed_at: DateTime<Utc>,
}

impl From<Order> for PublicOrder {
    fn from(order: Order) -> Self {
        Self {
            number: order.number,
            customer_name: order.customer.name,
            status: order.status,
            status_label: order.status.label(),
            items: order.items,
            subtotal: order.subtotal,
            delivery_fee: order.delivery_fee,
            discount: order.discount,
            total: order.total,
            payment_method: order.payment_method,
            estimated_minutes: order.estimated_minutes,
            placed_at: order.placed_at,
        }
    }
}

/// Place an order.
///
/// POST /api/orders
///
/// Prices come from the menu; the body only names items and quantities.
pub async fn create(
    State(state): State<AppState>,
    OptionalAuth(current): OptionalAuth,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<PlacedOrder>)> {
    let checkout = CheckoutService::new(state.ledger(), state.stores().customers.as_ref());
    let placement = checkout.place(current.as_ref(), &body).await?;

    let number = placement.order.number.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("number", number.as_str())]));

    let tracking_url = placement.order.tracking_path();
    Ok((
        StatusCode::CREATED,
        Json(PlacedOrder {
            order: placement.order.into(),
            whatsapp: placement.notification,
            tracking_url,
        }),
    ))
}

/// Look an order up by its number.
///
/// GET /api/orders/number/{number}
pub async fn show_by_number(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<PublicOrder>> {
    let number = parse_number(&number)?;
    let order = state.ledger().get_by_number(number).await?;
    Ok(Json(PublicOrder::from(order)))
}

/// Parse an order number from a path segment.
pub(crate) fn parse_number(raw: &str) -> Result<OrderNumber> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid order number: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("000042").ok(), Some(OrderNumber::new(42)));
        assert_eq!(parse_number("42").ok(), Some(OrderNumber::new(42)));
        assert!(matches!(parse_number("abc"), Err(AppError::BadRequest(_))));
    }
}
