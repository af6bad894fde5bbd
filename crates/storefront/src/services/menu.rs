//! Read-through cache in front of the menu repository.
//!
//! Listings, single items and categories are cached with a fixed TTL, so an
//! admin edit can take up to one TTL to show on the storefront. Text searches
//! bypass the cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use delivery_core::menu::{MenuFilter, MenuItem};
use delivery_core::store::{MenuStore, Result};
use delivery_core::{MenuCategory, MenuItemId};

#[derive(Clone)]
enum CacheValue {
    Items(Arc<Vec<MenuItem>>),
    Item(Box<MenuItem>),
    Categories(Arc<Vec<MenuCategory>>),
}

/// Cached access to the menu.
#[derive(Clone)]
pub struct MenuCatalog {
    inner: Arc<MenuCatalogInner>,
}

struct MenuCatalogInner {
    store: Arc<dyn MenuStore>,
    cache: Cache<String, CacheValue>,
}

impl MenuCatalog {
    #[must_use]
    pub fn new(store: Arc<dyn MenuStore>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1000).time_to_live(ttl).build();

        Self {
            inner: Arc::new(MenuCatalogInner { store, cache }),
        }
    }

    /// List menu items matching `filter`, sorted by category then name.
    ///
    /// # Errors
    ///
    /// Returns the repository error on a cache miss that fails to load.
    pub async fn list(&self, filter: &MenuFilter) -> Result<Arc<Vec<MenuItem>>> {
        let searching = filter.search.as_deref().is_some_and(|s| !s.trim().is_empty());
        if searching {
            return Ok(Arc::new(self.inner.store.list(filter).await?));
        }

        let cache_key = format!("items:{:?}:{:?}", filter.category, filter.available);
        if let Some(CacheValue::Items(items)) = self.inner.cache.get(&cache_key).await {
            debug!(cache_key = %cache_key, "Menu cache hit");
            return Ok(items);
        }

        let items = Arc::new(self.inner.store.list(filter).await?);
        self.inner
            .cache
            .insert(cache_key, CacheValue::Items(Arc::clone(&items)))
            .await;
        Ok(items)
    }

    /// # Errors
    ///
    /// Returns the repository error on a cache miss that fails to load.
    pub async fn get(&self, id: MenuItemId) -> Result<Option<MenuItem>> {
        let cache_key = format!("item:{id}");
        if let Some(CacheValue::Item(item)) = self.inner.cache.get(&cache_key).await {
            return Ok(Some(*item));
        }

        let item = self.inner.store.get(id).await?;
        if let Some(item) = &item {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Item(Box::new(item.clone())))
                .await;
        }
        Ok(item)
    }

    /// # Errors
    ///
    /// Returns the repository error on a cache miss that fails to load.
    pub async fn categories(&self) -> Result<Arc<Vec<MenuCategory>>> {
        let cache_key = "categories".to_string();
        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            return Ok(categories);
        }

        let categories = Arc::new(self.inner.store.categories().await?);
        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(Arc::clone(&categories)))
            .await;
        Ok(categories)
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
