//! Customer management route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use serde::Deserialize;

use delivery_core::CustomerId;
use delivery_core::customer::{Customer, CustomerPage, CustomerProfileInput, CustomerQuery};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub city: Option<String>,
    pub active: Option<bool>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
}

impl From<ListQuery> for CustomerQuery {
    fn from(query: ListQuery) -> Self {
        Self {
            search: query.search.filter(|s| !s.trim().is_empty()),
            city: query.city.filter(|s| !s.trim().is_empty()),
            active: query.active,
            page: query.page,
            limit: query.limit,
        }
        .normalized()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusUpdate {
    pub active: bool,
}

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(index))
        .route("/api/customers/{id}", get(show).put(update))
        .route("/api/customers/{id}/status", patch(set_status))
}

/// GET /api/customers
async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<CustomerPage>> {
    let page = state.stores().customers.list(&query.into()).await?;
    Ok(Json(page))
}

/// GET /api/customers/{id}
async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(id): Path<i32>,
) -> Result<Json<Customer>> {
    state
        .stores()
        .customers
        .get(CustomerId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("customer {id}")))
}

/// PUT /api/customers/{id}
async fn update(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<i32>,
    Json(body): Json<CustomerProfileInput>,
) -> Result<Json<Customer>> {
    let customer = state
        .stores()
        .customers
        .update(CustomerId::new(id), body.validate()?)
        .await?;
    tracing::info!(customer_id = %customer.id, admin_id = %admin.id, "Customer updated by admin");
    Ok(Json(customer))
}

/// Activate or deactivate a customer. Inactive customers cannot log in.
///
/// PATCH /api/customers/{id}/status
async fn set_status(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<i32>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<Customer>> {
    let customer = state
        .stores()
        .customers
        .set_active(CustomerId::new(id), body.active)
        .await?;
    tracing::info!(
        customer_id = %customer.id,
        active = customer.active,
        admin_id = %admin.id,
        "Customer status changed"
    );
    Ok(Json(customer))
}
