//! Menu management route handlers.
//!
//! Edits reach the storefront once its menu cache expires. Orders already
//! placed keep the name and price they were placed with.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use serde::Deserialize;

use delivery_core::MenuItemId;
use delivery_core::menu::{MenuFilter, MenuItem, MenuItemInput};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AvailabilityUpdate {
    pub available: bool,
}

/// Build the menu router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/menu", get(index).post(create))
        .route("/api/menu/{id}", get(show).put(update).delete(destroy))
        .route("/api/menu/{id}/availability", patch(set_availability))
}

/// Every item, available or not, unless filtered.
///
/// GET /api/menu
async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Query(filter): Query<MenuFilter>,
) -> Result<Json<Vec<MenuItem>>> {
    Ok(Json(state.stores().menu.list(&filter).await?))
}

/// GET /api/menu/{id}
async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(id): Path<i32>,
) -> Result<Json<MenuItem>> {
    state
        .stores()
        .menu
        .get(MenuItemId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("menu item {id}")))
}

/// POST /api/menu
async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Json(body): Json<MenuItemInput>,
) -> Result<(StatusCode, Json<MenuItem>)> {
    let item = state.stores().menu.create(body.validate()?).await?;
    tracing::info!(menu_item_id = %item.id, admin_id = %admin.id, "Menu item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// Replace every editable field.
///
/// PUT /api/menu/{id}
async fn update(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<i32>,
    Json(body): Json<MenuItemInput>,
) -> Result<Json<MenuItem>> {
    let item = state
        .stores()
        .menu
        .update(MenuItemId::new(id), body.validate()?)
        .await?;
    tracing::info!(menu_item_id = %item.id, admin_id = %admin.id, "Menu item updated");
    Ok(Json(item))
}

/// DELETE /api/menu/{id}
async fn destroy(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    state.stores().menu.delete(MenuItemId::new(id)).await?;
    tracing::info!(menu_item_id = id, admin_id = %admin.id, "Menu item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/menu/{id}/availability
async fn set_availability(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(id): Path<i32>,
    Json(body): Json<AvailabilityUpdate>,
) -> Result<Json<MenuItem>> {
    let item = state
        .stores()
        .menu
        .set_available(MenuItemId::new(id), body.available)
        .await?;
    Ok(Json(item))
}
