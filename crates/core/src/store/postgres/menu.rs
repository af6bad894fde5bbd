//! Menu repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};

use super::{non_negative, to_i32};
use crate::menu::{MenuFilter, MenuItem, MenuItemDraft};
use crate::store::{MenuStore, RepositoryError, Result};
use crate::types::{MenuCategory, MenuItemId, Money};

const MENU_COLUMNS: &str = "id, name, description, price, category, image_url, available, \
     prep_minutes, ingredients, notes, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct MenuItemRow {
    id: MenuItemId,
    name: String,
    description: String,
    price: Money,
    category: MenuCategory,
    image_url: Option<String>,
    available: bool,
    prep_minutes: i32,
    ingredients: Vec<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MenuItemRow> for MenuItem {
    type Error = RepositoryError;

    fn try_from(row: MenuItemRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category: row.category,
            image_url: row.image_url,
            available: row.available,
            prep_minutes: non_negative("prep_minutes", row.prep_minutes)?,
            ingredients: row.ingredients,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// `PostgreSQL` implementation of [`MenuStore`].
#[derive(Clone)]
pub struct PgMenuStore {
    pool: PgPool,
}

impl PgMenuStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuStore for PgMenuStore {
    async fn get(&self, id: MenuItemId) -> Result<Option<MenuItem>> {
        let sql = format!("SELECT {MENU_COLUMNS} FROM delivery.menu_item WHERE id = $1");
        sqlx::query_as::<_, MenuItemRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(MenuItem::try_from)
            .transpose()
    }

    async fn list(&self, filter: &MenuFilter) -> Result<Vec<MenuItem>> {
        let mut query = QueryBuilder::new(format!("SELECT {MENU_COLUMNS} FROM delivery.menu_item WHERE TRUE"));
        if let Some(category) = filter.category {
            query.push(" AND category = ").push_bind(category);
        }
        if let Some(available) = filter.available {
            query.push(" AND available = ").push_bind(available);
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", term.replace('%', "\\%").replace('_', "\\_"));
            query
                .push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        query.push(" ORDER BY category, name");

        query
            .build_query_as::<MenuItemRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(MenuItem::try_from)
            .collect()
    }

    async fn categories(&self) -> Result<Vec<MenuCategory>> {
        let categories =
            sqlx::query_scalar("SELECT DISTINCT category FROM delivery.menu_item ORDER BY category")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    async fn create(&self, draft: MenuItemDraft) -> Result<MenuItem> {
        let sql = format!(
            r"
            INSERT INTO delivery.menu_item
                (name, description, price, category, image_url, available, prep_minutes, ingredients, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {MENU_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, MenuItemRow>(&sql)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.price)
            .bind(draft.category)
            .bind(draft.image_url.as_deref())
            .bind(draft.available)
            .bind(to_i32("prep_minutes", draft.prep_minutes)?)
            .bind(&draft.ingredients)
            .bind(draft.notes.as_deref())
            .fetch_one(&self.pool)
            .await?;

        MenuItem::try_from(row)
    }

    async fn update(&self, id: MenuItemId, draft: MenuItemDraft) -> Result<MenuItem> {
        let sql = format!(
            r"
            UPDATE delivery.menu_item
            SET name = $2, description = $3, price = $4, category = $5, image_url = $6,
                available = $7, prep_minutes = $8, ingredients = $9, notes = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {MENU_COLUMNS}
            "
        );

        sqlx::query_as::<_, MenuItemRow>(&sql)
            .bind(id)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.price)
            .bind(draft.category)
            .bind(draft.image_url.as_deref())
            .bind(draft.available)
            .bind(to_i32("prep_minutes", draft.prep_minutes)?)
            .bind(&draft.ingredients)
            .bind(draft.notes.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
            .and_then(MenuItem::try_from)
    }

    async fn delete(&self, id: MenuItemId) -> Result<()> {
        let result = sqlx::query("DELETE FROM delivery.menu_item WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_available(&self, id: MenuItemId, available: bool) -> Result<MenuItem> {
        let sql = format!(
            "UPDATE delivery.menu_item SET available = $2, updated_at = NOW() WHERE id = $1 RETURNING {MENU_COLUMNS}"
        );

        sqlx::query_as::<_, MenuItemRow>(&sql)
            .bind(id)
            .bind(available)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
            .and_then(MenuItem::try_from)
    }
}
