//! Public order tracking.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::Deserialize;

use delivery_core::tracking::{OrderSummary, TrackingView};
use delivery_core::{Email, Phone};

use crate::error::{AppError, Result};
use crate::routes::orders::parse_number;
use crate::state::AppState;

/// Body of a tracking search. At least one field is required.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackingSearch {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tracking page data for one order.
///
/// GET /api/tracking/{number}
pub async fn show(State(state): State<AppState>, Path(number): Path<String>) -> Result<Json<TrackingView>> {
    let number = parse_number(&number)?;
    let order = state.ledger().get_by_number(number).await?;
    Ok(Json(TrackingView::new(&order, Utc::now())))
}

/// Find orders by the phone or email used at checkout, newest first.
///
/// POST /api/tracking/search
pub async fn search(
    State(state): State<AppState>,
    Json(body): Json<TrackingSearch>,
) -> Result<Json<Vec<OrderSummary>>> {
    let phone = non_blank(body.phone.as_deref())
        .map(Phone::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let email = non_blank(body.email.as_deref())
        .map(Email::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if phone.is_none() && email.is_none() {
        return Err(AppError::BadRequest("provide a phone or an email".to_string()));
    }

    let orders = state
        .stores()
        .orders
        .find_by_contact(phone.as_ref(), email.as_ref())
        .await?;

    Ok(Json(orders.iter().map(OrderSummary::from).collect()))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
