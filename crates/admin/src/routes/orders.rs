//! Order management route handlers.
//!
//! Listing, lookup, status changes and WhatsApp links. Orders are never
//! edited or deleted here; the status history is the audit trail.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use delivery_core::notify::Notification;
use delivery_core::order::{DashboardStats, DashboardWindow, Order, OrderPage, OrderQuery, OrderSort, SortDirection};
use delivery_core::order::query::MAX_LIMIT;
use delivery_core::{CustomerId, OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Filters, sort and paging for the order list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<i32>,
    /// Inclusive, RFC 3339.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive, RFC 3339.
    pub to: Option<DateTime<Utc>>,
    pub sort: Option<OrderSort>,
    pub direction: Option<SortDirection>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListQuery {
    fn into_order_query(self) -> Result<OrderQuery> {
        if self.from.zip(self.to).is_some_and(|(from, to)| from >= to) {
            return Err(AppError::BadRequest("`from` must be before `to`".to_string()));
        }

        let defaults = OrderQuery::default();
        Ok(OrderQuery {
            status: self.status,
            customer: self.customer_id.map(CustomerId::new),
            placed_from: self.from,
            placed_to: self.to,
            sort: self.sort.unwrap_or(defaults.sort),
            direction: self.direction.unwrap_or(defaults.direction),
            page: self.page.unwrap_or(defaults.page),
            limit: self.limit.unwrap_or(defaults.limit),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    #[serde(default)]
    pub note: Option<String>,
}

/// An order plus the WhatsApp link produced by the change, if any.
#[derive(Debug, Serialize)]
pub struct OrderWithLink {
    pub order: Order,
    pub whatsapp: Option<Notification>,
}

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(index))
        .route("/api/orders/pending", get(pending))
        .route("/api/orders/dashboard", get(dashboard))
        .route("/api/orders/number/{number}", get(show_by_number))
        .route("/api/orders/{id}", get(show))
        .route("/api/orders/{id}/status", patch(update_status))
        .route("/api/orders/{id}/whatsapp", post(resend_whatsapp))
}

/// GET /api/orders
async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<OrderPage>> {
    let page = state.ledger().list(query.into_order_query()?).await?;
    Ok(Json(page))
}

/// Orders waiting for confirmation, newest first.
///
/// GET /api/orders/pending
async fn pending(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
) -> Result<Json<OrderPage>> {
    let page = state
        .ledger()
        .list(OrderQuery {
            status: Some(OrderStatus::Pending),
            limit: MAX_LIMIT,
            ..OrderQuery::default()
        })
        .await?;
    Ok(Json(page))
}

/// GET /api/orders/dashboard
async fn dashboard(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
) -> Result<Json<DashboardStats>> {
    let window = DashboardWindow::for_day(Utc::now(), state.config().store.utc_offset);
    let stats = state.stores().orders.dashboard(&window).await?;
    Ok(Json(stats))
}

/// GET /api/orders/{id}
async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(id): Path<i32>,
) -> Result<Json<Order>> {
    Ok(Json(state.ledger().get(OrderId::new(id)).await?))
}

/// GET /api/orders/number/{number}
async fn show_by_number(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(number): Path<String>,
) -> Result<Json<Order>> {
    let number = number
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid order number: {number}")))?;
    Ok(Json(state.ledger().get_by_number(number).await?))
}

/// Move an order to a new status.
///
/// PATCH /api/orders/{id}/status
///
/// Answers with the customer's WhatsApp link when the status changed.
async fn update_status(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<i32>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<OrderWithLink>> {
    let transition = state
        .ledger()
        .transition_status(OrderId::new(id), body.status, body.note)
        .await?;

    tracing::info!(
        order_id = %transition.order.id,
        status = %transition.order.status,
        admin_id = %admin.id,
        "Status updated by admin"
    );

    Ok(Json(OrderWithLink {
        order: transition.order,
        whatsapp: transition.notification,
    }))
}

/// Rebuild the store's WhatsApp link for an order and mark it sent.
///
/// POST /api/orders/{id}/whatsapp
async fn resend_whatsapp(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(id): Path<i32>,
) -> Result<Json<OrderWithLink>> {
    let placement = state.ledger().resend_whatsapp(OrderId::new(id)).await?;
    Ok(Json(OrderWithLink {
        order: placement.order,
        whatsapp: Some(placement.notification),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query = ListQuery::default().into_order_query().unwrap();
        assert_eq!(query, OrderQuery::default());
    }

    #[test]
    fn test_list_query_rejects_inverted_range() {
        let now = Utc::now();
        let query = ListQuery {
            from: Some(now),
            to: Some(now - chrono::Duration::hours(1)),
            ..ListQuery::default()
        };
        assert!(matches!(query.into_order_query(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_status_update_rejects_unknown_status() {
        let parsed = serde_json::from_str::<StatusUpdate>(r#"{"status":"shipped"}"#);
        assert!(parsed.is_err());
        let parsed = serde_json::from_str::<StatusUpdate>(r#"{"status":"out_for_delivery"}"#).unwrap();
        assert_eq!(parsed.status, OrderStatus::OutForDelivery);
    }
}
