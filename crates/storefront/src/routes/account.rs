//! Account route handlers.
//!
//! These routes require authentication.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use delivery_core::customer::{Customer, CustomerProfileInput};
use delivery_core::order::OrderQuery;
use delivery_core::tracking::OrderSummary;

use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, set_current_customer};
use crate::models::CurrentCustomer;
use crate::state::AppState;

/// Paging for the order history.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// One page of the customer's own orders, newest first.
#[derive(Debug, Serialize)]
pub struct OrderHistory {
    pub orders: Vec<OrderSummary>,
    pub total: u64,
}

/// Show the logged-in customer's profile.
///
/// GET /api/account
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Customer>> {
    state
        .stores()
        .customers
        .get(current.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("account".to_string()))
}

/// Replace the logged-in customer's profile.
///
/// PUT /api/account
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Json(body): Json<CustomerProfileInput>,
) -> Result<Json<Customer>> {
    let profile = body.validate()?;
    let customer = state.stores().customers.update(current.id, profile).await?;

    // Keep the session copy of name and email in step
    set_current_customer(&session, &CurrentCustomer::from(&customer))
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    tracing::info!(customer_id = %customer.id, "Customer profile updated");
    Ok(Json(customer))
}

/// The logged-in customer's orders.
///
/// GET /api/account/orders?page=&limit=
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<OrderHistory>> {
    let defaults = OrderQuery::default();
    let page = state
        .ledger()
        .list(OrderQuery {
            customer: Some(current.id),
            page: query.page.unwrap_or(defaults.page),
            limit: query.limit.unwrap_or(defaults.limit),
            ..defaults
        })
        .await?;

    Ok(Json(OrderHistory {
        orders: page.orders.iter().map(OrderSummary::from).collect(),
        total: page.total,
    }))
}
