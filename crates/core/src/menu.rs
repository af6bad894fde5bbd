//! The menu: items customers can order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{MenuCategory, MenuItemId, Money};
use crate::validation::ValidationErrors;

/// Default preparation time for new items.
pub const DEFAULT_PREP_MINUTES: u32 = 30;

/// An orderable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category: MenuCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub available: bool,
    pub prep_minutes: u32,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for creating or replacing a [`MenuItem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemDraft {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category: MenuCategory,
    pub image_url: Option<String>,
    pub available: bool,
    pub prep_minutes: u32,
    pub ingredients: Vec<String>,
    pub notes: Option<String>,
}

fn default_available() -> bool {
    true
}

/// Menu item as submitted by the admin form or a seed file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MenuItemInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: MenuCategory,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub prep_minutes: Option<u32>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl MenuItemInput {
    /// Validate into a [`MenuItemDraft`].
    ///
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn validate(&self) -> Result<MenuItemDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.text("name", &self.name, 100);
        let description = errors.text("description", &self.description, 500);
        if self.price <= Decimal::ZERO {
            errors.push("price", "must be greater than zero");
        } else if self.price > Money::MAX.amount() {
            errors.push("price", format!("must not exceed {}", Money::MAX));
        }
        let prep_minutes = self.prep_minutes.unwrap_or(DEFAULT_PREP_MINUTES);
        if prep_minutes == 0 {
            errors.push("prepMinutes", "must be at least 1");
        }
        let image_url = errors.optional_text("imageUrl", self.image_url.as_deref(), 500);
        let notes = errors.optional_text("notes", self.notes.as_deref(), 200);
        let ingredients = self
            .ingredients
            .iter()
            .map(|i| i.trim().to_owned())
            .filter(|i| !i.is_empty())
            .collect();

        errors.finish(MenuItemDraft {
            name,
            description,
            price: Money::new(self.price),
            category: self.category,
            image_url,
            available: self.available,
            prep_minutes,
            ingredients,
            notes,
        })
    }
}

/// Storefront listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct MenuFilter {
    pub category: Option<MenuCategory>,
    pub available: Option<bool>,
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
}

impl MenuFilter {
    /// Whether `item` passes every set filter.
    #[must_use]
    pub fn matches(&self, item: &MenuItem) -> bool {
        if self.category.is_some_and(|c| c != item.category) {
            return false;
        }
        if self.available.is_some_and(|a| a != item.available) {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => {
                let term = term.to_lowercase();
                item.name.to_lowercase().contains(&term)
                    || item.description.to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}
