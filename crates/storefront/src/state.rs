//! Application state shared across handlers.

use std::sync::Arc;

use delivery_core::ledger::{OrderLedger, TransitionPolicy};
use delivery_core::store::Stores;

use crate::config::StorefrontConfig;
use crate::services::MenuCatalog;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like repositories and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    stores: Stores,
    ledger: OrderLedger,
    menu: MenuCatalog,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The storefront never changes order status, so the ledger's transition
    /// policy is irrelevant here and left at its default.
    #[must_use]
    pub fn new(config: StorefrontConfig, stores: Stores) -> Self {
        let ledger = OrderLedger::new(&stores, config.store.notifier(), TransitionPolicy::default());
        let menu = MenuCatalog::new(Arc::clone(&stores.menu), config.menu_cache_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                stores,
                ledger,
                menu,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the repositories.
    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    /// Get the order ledger.
    #[must_use]
    pub fn ledger(&self) -> &OrderLedger {
        &self.inner.ledger
    }

    /// Get the cached menu.
    #[must_use]
    pub fn menu(&self) -> &MenuCatalog {
        &self.inner.menu
    }
}
