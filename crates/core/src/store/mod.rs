//! Persistence boundary.
//!
//! Each aggregate has a repository trait with two implementations: an
//! in-memory one ([`memory`]) for tests and local demos, and a `PostgreSQL`
//! one (`postgres`, behind the `postgres` feature) for production. Business
//! rules live in the [`ledger`](crate::ledger) and the input types, never in
//! the repositories.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/core/migrations/` and run via:
//! ```bash
//! cargo run -p delivery-cli -- migrate
//! ```

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::admin::{AdminUser, NewAdmin};
use crate::customer::{Customer, CustomerPage, CustomerProfile, CustomerQuery};
use crate::menu::{MenuFilter, MenuItem, MenuItemDraft};
use crate::order::{DashboardStats, DashboardWindow, NewOrder, Order, OrderNumber, OrderPage, OrderQuery};
use crate::types::{AdminUserId, CustomerId, Email, MenuCategory, MenuItemId, OrderId, Phone};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation or lost optimistic-concurrency race.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Order records. Orders are never deleted.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order, allocating its id and the next order number.
    ///
    /// Number allocation is atomic with the insert: sequential calls get
    /// strictly increasing numbers and no number is ever handed out twice.
    async fn insert(&self, order: NewOrder) -> Result<Order>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    async fn get_by_number(&self, number: OrderNumber) -> Result<Option<Order>>;

    /// Write the status fields of `order` (status, history, timestamps)
    /// if the stored version still equals `expected_version`.
    ///
    /// Returns the stored order with its version bumped.
    ///
    /// # Errors
    ///
    /// `NotFound` if the order is gone, `Conflict` if another write won.
    async fn update_status(&self, order: &Order, expected_version: i32) -> Result<Order>;

    /// Record the last store WhatsApp link issued for an order.
    async fn mark_whatsapp_sent(&self, id: OrderId, url: &str) -> Result<Order>;

    async fn list(&self, query: &OrderQuery) -> Result<OrderPage>;

    /// Orders whose customer snapshot matches either contact, newest first.
    async fn find_by_contact(&self, phone: Option<&Phone>, email: Option<&Email>) -> Result<Vec<Order>>;

    async fn dashboard(&self, window: &DashboardWindow) -> Result<DashboardStats>;

    /// Cheap round trip used by the readiness check.
    async fn ping(&self) -> Result<()>;
}

/// The menu.
#[async_trait]
pub trait MenuStore: Send + Sync {
    async fn get(&self, id: MenuItemId) -> Result<Option<MenuItem>>;

    /// Items matching `filter`, sorted by category then name.
    async fn list(&self, filter: &MenuFilter) -> Result<Vec<MenuItem>>;

    /// Categories that have at least one item, in menu order.
    async fn categories(&self) -> Result<Vec<MenuCategory>>;

    async fn create(&self, draft: MenuItemDraft) -> Result<MenuItem>;

    /// Replace every editable field. `NotFound` if missing.
    async fn update(&self, id: MenuItemId, draft: MenuItemDraft) -> Result<MenuItem>;

    /// `NotFound` if missing.
    async fn delete(&self, id: MenuItemId) -> Result<()>;

    async fn set_available(&self, id: MenuItemId, available: bool) -> Result<MenuItem>;
}

/// Customers and their credentials.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn get(&self, id: CustomerId) -> Result<Option<Customer>>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>>;

    /// `Conflict` if the email or phone is already registered.
    async fn create(&self, profile: CustomerProfile, password_hash: Option<String>) -> Result<Customer>;

    /// The customer a guest checkout orders as.
    ///
    /// An unknown email creates a passwordless customer. A passwordless
    /// customer with the same email is overwritten with `profile`, so the
    /// order carries what was typed rather than what was stored. An email
    /// that has a password is `Conflict`: that account has to log in.
    async fn resolve_guest(&self, profile: CustomerProfile) -> Result<Customer> {
        let Some(existing) = self.find_by_email(&profile.email).await? else {
            return self.create(profile, None).await;
        };
        if self.credentials(&existing.email).await?.is_some() {
            return Err(RepositoryError::Conflict(
                "an account exists for this email; log in to order".to_string(),
            ));
        }
        self.update(existing.id, profile).await
    }

    /// `NotFound` if missing, `Conflict` on a duplicate email or phone.
    async fn update(&self, id: CustomerId, profile: CustomerProfile) -> Result<Customer>;

    async fn set_active(&self, id: CustomerId, active: bool) -> Result<Customer>;

    /// Newest first.
    async fn list(&self, query: &CustomerQuery) -> Result<CustomerPage>;

    /// The customer and stored password hash, if the account has a password.
    async fn credentials(&self, email: &Email) -> Result<Option<(Customer, String)>>;
}

/// Admin accounts.
#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn count(&self) -> Result<u64>;

    /// `Conflict` if the email is taken.
    async fn create(&self, admin: NewAdmin, password_hash: String) -> Result<AdminUser>;

    async fn get(&self, id: AdminUserId) -> Result<Option<AdminUser>>;

    async fn credentials(&self, email: &Email) -> Result<Option<(AdminUser, String)>>;

    async fn record_login(&self, id: AdminUserId) -> Result<()>;
}

/// One handle per repository, shared by everything that needs storage.
#[derive(Clone)]
pub struct Stores {
    pub orders: Arc<dyn OrderStore>,
    pub menu: Arc<dyn MenuStore>,
    pub customers: Arc<dyn CustomerStore>,
    pub admins: Arc<dyn AdminStore>,
}

impl Stores {
    /// Fresh, empty in-memory repositories.
    #[must_use]
    pub fn in_memory() -> Self {
        let db = memory::MemoryDb::new();
        Self {
            orders: Arc::new(db.clone()),
            menu: Arc::new(db.clone()),
            customers: Arc::new(db.clone()),
            admins: Arc::new(db),
        }
    }

    /// Repositories backed by a `PostgreSQL` pool.
    #[cfg(feature = "postgres")]
    #[must_use]
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            orders: Arc::new(postgres::PgOrderStore::new(pool.clone())),
            menu: Arc::new(postgres::PgMenuStore::new(pool.clone())),
            customers: Arc::new(postgres::PgCustomerStore::new(pool.clone())),
            admins: Arc::new(postgres::PgAdminStore::new(pool)),
        }
    }
}
