//! In-memory repositories.
//!
//! A single mutex guards every table, so each trait call is atomic with
//! respect to the others. Order numbers are allocated under the same lock as
//! the insert.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::{AdminStore, CustomerStore, MenuStore, OrderStore, RepositoryError, Result};
use crate::admin::{AdminUser, NewAdmin};
use crate::customer::{Customer, CustomerPage, CustomerProfile, CustomerQuery};
use crate::menu::{MenuFilter, MenuItem, MenuItemDraft};
use crate::order::{
    DashboardStats, DashboardWindow, NewOrder, Order, OrderNumber, OrderPage, OrderQuery, OrderStats,
};
use crate::types::{AdminUserId, CustomerId, Email, MenuCategory, MenuItemId, OrderId, Phone};

#[derive(Default)]
struct Tables {
    orders: BTreeMap<OrderId, Order>,
    last_order_id: i32,
    last_order_number: OrderNumber,
    menu: BTreeMap<MenuItemId, MenuItem>,
    last_menu_id: i32,
    customers: BTreeMap<CustomerId, (Customer, Option<String>)>,
    last_customer_id: i32,
    admins: BTreeMap<AdminUserId, (AdminUser, String)>,
    last_admin_id: i32,
}

impl Tables {
    fn contact_taken(&self, profile: &CustomerProfile, except: Option<CustomerId>) -> Option<&'static str> {
        self.customers
            .values()
            .filter(|(c, _)| Some(c.id) != except)
            .find_map(|(c, _)| {
                if c.email == profile.email {
                    Some("email already registered")
                } else if c.phone == profile.phone {
                    Some("phone already registered")
                } else {
                    None
                }
            })
    }
}

/// Every repository trait over one shared set of tables.
///
/// Clones share state.
#[derive(Clone, Default)]
pub struct MemoryDb {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryDb {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering after `number`, as if older orders existed.
    pub fn set_last_order_number(&self, number: OrderNumber) {
        self.tables.lock().last_order_number = number;
    }
}

fn page<T: Clone>(rows: &[T], offset: u32, limit: u32) -> Vec<T> {
    rows.iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl OrderStore for MemoryDb {
    async fn insert(&self, order: NewOrder) -> Result<Order> {
        let mut tables = self.tables.lock();
        tables.last_order_id += 1;
        tables.last_order_number = tables.last_order_number.next();

        let order = order.into_order(OrderId::new(tables.last_order_id), tables.last_order_number);
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.tables.lock().orders.get(&id).cloned())
    }

    async fn get_by_number(&self, number: OrderNumber) -> Result<Option<Order>> {
        Ok(self
            .tables
            .lock()
            .orders
            .values()
            .find(|o| o.number == number)
            .cloned())
    }

    async fn update_status(&self, order: &Order, expected_version: i32) -> Result<Order> {
        let mut tables = self.tables.lock();
        let stored = tables.orders.get_mut(&order.id).ok_or(RepositoryError::NotFound)?;
        if stored.version != expected_version {
            return Err(RepositoryError::Conflict(format!(
                "order {} was modified concurrently",
                order.id
            )));
        }

        stored.status = order.status;
        stored.history.clone_from(&order.history);
        stored.confirmed_at = order.confirmed_at;
        stored.delivered_at = order.delivered_at;
        stored.updated_at = order.updated_at;
        stored.version = expected_version + 1;
        Ok(stored.clone())
    }

    async fn mark_whatsapp_sent(&self, id: OrderId, url: &str) -> Result<Order> {
        let mut tables = self.tables.lock();
        let stored = tables.orders.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        stored.whatsapp_sent = true;
        stored.whatsapp_url = Some(url.to_owned());
        stored.updated_at = Utc::now();
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn list(&self, query: &OrderQuery) -> Result<OrderPage> {
        let tables = self.tables.lock();
        let mut matching: Vec<Order> = tables.orders.values().filter(|o| query.matches(o)).cloned().collect();
        drop(tables);

        query.sort(&mut matching);
        let stats = OrderStats::from_orders(&matching);
        Ok(OrderPage {
            orders: page(&matching, query.offset(), query.limit),
            total: stats.count,
            stats,
        })
    }

    async fn find_by_contact(&self, phone: Option<&Phone>, email: Option<&Email>) -> Result<Vec<Order>> {
        let tables = self.tables.lock();
        let mut found: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| {
                phone.is_some_and(|p| *p == o.customer.phone) || email.is_some_and(|e| *e == o.customer.email)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.number.cmp(&a.number));
        Ok(found)
    }

    async fn dashboard(&self, window: &DashboardWindow) -> Result<DashboardStats> {
        let tables = self.tables.lock();
        Ok(DashboardStats::compute(tables.orders.values(), window))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl MenuStore for MemoryDb {
    async fn get(&self, id: MenuItemId) -> Result<Option<MenuItem>> {
        Ok(self.tables.lock().menu.get(&id).cloned())
    }

    async fn list(&self, filter: &MenuFilter) -> Result<Vec<MenuItem>> {
        let mut items: Vec<MenuItem> = self
            .tables
            .lock()
            .menu
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        Ok(items)
    }

    async fn categories(&self) -> Result<Vec<MenuCategory>> {
        let tables = self.tables.lock();
        Ok(MenuCategory::ALL
            .into_iter()
            .filter(|c| tables.menu.values().any(|i| i.category == *c))
            .collect())
    }

    async fn create(&self, draft: MenuItemDraft) -> Result<MenuItem> {
        let mut tables = self.tables.lock();
        tables.last_menu_id += 1;
        let now = Utc::now();
        let item = MenuItem {
            id: MenuItemId::new(tables.last_menu_id),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            category: draft.category,
            image_url: draft.image_url,
            available: draft.available,
            prep_minutes: draft.prep_minutes,
            ingredients: draft.ingredients,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        };
        tables.menu.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update(&self, id: MenuItemId, draft: MenuItemDraft) -> Result<MenuItem> {
        let mut tables = self.tables.lock();
        let item = tables.menu.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        item.name = draft.name;
        item.description = draft.description;
        item.price = draft.price;
        item.category = draft.category;
        item.image_url = draft.image_url;
        item.available = draft.available;
        item.prep_minutes = draft.prep_minutes;
        item.ingredients = draft.ingredients;
        item.notes = draft.notes;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete(&self, id: MenuItemId) -> Result<()> {
        self.tables
            .lock()
            .menu
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn set_available(&self, id: MenuItemId, available: bool) -> Result<MenuItem> {
        let mut tables = self.tables.lock();
        let item = tables.menu.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        item.available = available;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }
}

#[async_trait]
impl CustomerStore for MemoryDb {
    async fn get(&self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.tables.lock().customers.get(&id).map(|(c, _)| c.clone()))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>> {
        Ok(self
            .tables
            .lock()
            .customers
            .values()
            .find(|(c, _)| c.email == *email)
            .map(|(c, _)| c.clone()))
    }

    async fn create(&self, profile: CustomerProfile, password_hash: Option<String>) -> Result<Customer> {
        let mut tables = self.tables.lock();
        if let Some(reason) = tables.contact_taken(&profile, None) {
            return Err(RepositoryError::Conflict(reason.to_owned()));
        }

        tables.last_customer_id += 1;
        let now = Utc::now();
        let customer = Customer {
            id: CustomerId::new(tables.last_customer_id),
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            address: profile.address,
            active: true,
            notes: profile.notes,
            created_at: now,
            updated_at: now,
        };
        tables
            .customers
            .insert(customer.id, (customer.clone(), password_hash));
        Ok(customer)
    }

    async fn update(&self, id: CustomerId, profile: CustomerProfile) -> Result<Customer> {
        let mut tables = self.tables.lock();
        if !tables.customers.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if let Some(reason) = tables.contact_taken(&profile, Some(id)) {
            return Err(RepositoryError::Conflict(reason.to_owned()));
        }

        let (customer, _) = tables.customers.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        customer.name = profile.name;
        customer.email = profile.email;
        customer.phone = profile.phone;
        customer.address = profile.address;
        customer.notes = profile.notes;
        customer.updated_at = Utc::now();
        Ok(customer.clone())
    }

    async fn set_active(&self, id: CustomerId, active: bool) -> Result<Customer> {
        let mut tables = self.tables.lock();
        let (customer, _) = tables.customers.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        customer.active = active;
        customer.updated_at = Utc::now();
        Ok(customer.clone())
    }

    async fn list(&self, query: &CustomerQuery) -> Result<CustomerPage> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let city = query.city.as_deref().map(str::trim).map(str::to_lowercase);

        let tables = self.tables.lock();
        let mut matching: Vec<Customer> = tables
            .customers
            .values()
            .map(|(c, _)| c)
            .filter(|c| query.active.is_none_or(|a| a == c.active))
            .filter(|c| city.as_ref().is_none_or(|city| c.address.city.to_lowercase() == *city))
            .filter(|c| {
                search.as_ref().is_none_or(|term| {
                    c.name.to_lowercase().contains(term.as_str())
                        || c.email.as_str().contains(term.as_str())
                        || c.phone.digits().contains(term.as_str())
                })
            })
            .cloned()
            .collect();
        drop(tables);

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(CustomerPage {
            total: matching.len() as u64,
            customers: page(&matching, query.offset(), query.limit),
        })
    }

    async fn credentials(&self, email: &Email) -> Result<Option<(Customer, String)>> {
        Ok(self
            .tables
            .lock()
            .customers
            .values()
            .find(|(c, _)| c.email == *email)
            .and_then(|(c, hash)| hash.clone().map(|h| (c.clone(), h))))
    }
}

#[async_trait]
impl AdminStore for MemoryDb {
    async fn count(&self) -> Result<u64> {
        Ok(self.tables.lock().admins.len() as u64)
    }

    async fn create(&self, admin: NewAdmin, password_hash: String) -> Result<AdminUser> {
        let mut tables = self.tables.lock();
        if tables.admins.values().any(|(a, _)| a.email == admin.email) {
            return Err(RepositoryError::Conflict("email already registered".to_owned()));
        }

        tables.last_admin_id += 1;
        let user = AdminUser {
            id: AdminUserId::new(tables.last_admin_id),
            name: admin.name,
            email: admin.email,
            active: true,
            last_login_at: None,
            created_at: Utc::now(),
        };
        tables.admins.insert(user.id, (user.clone(), password_hash));
        Ok(user)
    }

    async fn get(&self, id: AdminUserId) -> Result<Option<AdminUser>> {
        Ok(self.tables.lock().admins.get(&id).map(|(a, _)| a.clone()))
    }

    async fn credentials(&self, email: &Email) -> Result<Option<(AdminUser, String)>> {
        Ok(self
            .tables
            .lock()
            .admins
            .values()
            .find(|(a, _)| a.email == *email)
            .cloned())
    }

    async fn record_login(&self, id: AdminUserId) -> Result<()> {
        let mut tables = self.tables.lock();
        let (admin, _) = tables.admins.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        admin.last_login_at = Some(Utc::now());
        Ok(())
    }
}
