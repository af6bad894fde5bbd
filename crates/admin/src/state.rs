//! Application state shared across handlers.

use std::sync::Arc;

use delivery_core::ledger::OrderLedger;
use delivery_core::store::Stores;

use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    stores: Stores,
    ledger: OrderLedger,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The ledger takes its transition policy from the configuration.
    #[must_use]
    pub fn new(config: AdminConfig, stores: Stores) -> Self {
        let ledger = OrderLedger::new(&stores, config.store.notifier(), config.transition_policy);

        Self {
            inner: Arc::new(AppStateInner { config, stores, ledger }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    #[must_use]
    pub fn ledger(&self) -> &OrderLedger {
        &self.inner.ledger
    }
}
