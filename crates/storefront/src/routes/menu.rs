//! Public menu routes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;

use delivery_core::menu::{MenuFilter, MenuItem};
use delivery_core::{MenuCategory, MenuItemId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// A category with its display heading.
#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub value: MenuCategory,
    pub label: &'static str,
}

/// List menu items.
///
/// GET /api/menu?category=&available=&search=
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<MenuFilter>,
) -> Result<Json<Vec<MenuItem>>> {
    let items = state.menu().list(&filter).await?;
    Ok(Json(items.as_ref().clone()))
}

/// Categories that currently have at least one item.
///
/// GET /api/menu/categories
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryView>>> {
    let categories = state.menu().categories().await?;
    Ok(Json(
        categories
            .iter()
            .map(|&value| CategoryView {
                value,
                label: value.label(),
            })
            .collect(),
    ))
}

/// Show one menu item.
///
/// GET /api/menu/{id}
pub async fn show(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<MenuItem>> {
    let id = MenuItemId::new(id);
    state
        .menu()
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("menu item {id}")))
}
