//! The order ledger.
//!
//! [`OrderLedger`] is the only place orders are created or change status.
//! It resolves prices from the menu, snapshots the customer, derives totals,
//! enforces the configured transition policy and appends to the status
//! history. HTTP handlers and the CLI go through it rather than the
//! repositories.

mod error;
pub mod totals;

use core::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

pub use error::{LedgerError, Missing};
pub use totals::{Totals, compute_totals};

use crate::notify::{Notification, WhatsAppNotifier};
use crate::order::{
    CustomerSnapshot, DEFAULT_ESTIMATED_MINUTES, ITEM_NOTE_MAX, LineItem, NOTE_MAX, NewOrder, Order,
    OrderNumber, OrderPage, OrderQuery,
};
use crate::store::{CustomerStore, MenuStore, OrderStore, Stores};
use crate::types::{CustomerId, MenuItemId, Money, OrderId, OrderStatus, PaymentMethod, UnknownVariant};
use crate::validation::ValidationErrors;

/// How strictly status changes are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any status may follow any other, including repeats and moving back.
    #[default]
    Permissive,
    /// Only moves allowed by [`OrderStatus::can_transition_to`].
    Strict,
}

impl TransitionPolicy {
    #[must_use]
    pub const fn allows(&self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            Self::Permissive => true,
            Self::Strict => from.can_transition_to(to),
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "strict" => Ok(Self::Strict),
            _ => Err(UnknownVariant::new("transition policy", s)),
        }
    }
}

/// One requested line. Prices are never accepted from the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LineItemRequest {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
    #[serde(default)]
    pub note: Option<String>,
}

/// Everything needed to place an order, apart from who places it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderRequest {
    pub items: Vec<LineItemRequest>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub delivery_fee: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub note: Option<String>,
}

/// A placed order and the link that sends it to the store.
#[derive(Debug, Clone)]
pub struct Placement {
    pub order: Order,
    pub notification: Notification,
}

/// A status change and, if the status actually changed, the customer link.
#[derive(Debug, Clone)]
pub struct Transition {
    pub order: Order,
    pub notification: Option<Notification>,
}

/// Request fields that passed validation, before the catalog is consulted.
struct CheckedRequest {
    lines: Vec<(MenuItemId, u32, Option<String>)>,
    delivery_fee: Money,
    discount: Money,
    note: Option<String>,
}

impl OrderRequest {
    fn check(&self) -> Result<CheckedRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.items.is_empty() {
            errors.push("items", "must contain at least one item");
        }
        let lines: Vec<_> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if item.quantity == 0 {
                    errors.push(format!("items[{i}].quantity"), "must be at least 1");
                }
                let note = errors.optional_text(&format!("items[{i}].note"), item.note.as_deref(), ITEM_NOTE_MAX);
                (item.menu_item_id, item.quantity, note)
            })
            .collect();

        for (field, amount) in [("deliveryFee", self.delivery_fee), ("discount", self.discount)] {
            if amount < Decimal::ZERO {
                errors.push(field, "must not be negative");
            } else if amount > Money::MAX.amount() {
                errors.push(field, format!("must not exceed {}", Money::MAX));
            }
        }
        let note = errors.optional_text("note", self.note.as_deref(), NOTE_MAX);

        errors.finish(CheckedRequest {
            lines,
            delivery_fee: Money::new(self.delivery_fee),
            discount: Money::new(self.discount),
            note,
        })
    }
}

/// Creates orders and moves them through their lifecycle.
#[derive(Clone)]
pub struct OrderLedger {
    orders: Arc<dyn OrderStore>,
    menu: Arc<dyn MenuStore>,
    customers: Arc<dyn CustomerStore>,
    notifier: WhatsAppNotifier,
    policy: TransitionPolicy,
}

impl OrderLedger {
    #[must_use]
    pub fn new(stores: &Stores, notifier: WhatsAppNotifier, policy: TransitionPolicy) -> Self {
        Self {
            orders: Arc::clone(&stores.orders),
            menu: Arc::clone(&stores.menu),
            customers: Arc::clone(&stores.customers),
            notifier,
            policy,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    #[must_use]
    pub const fn notifier(&self) -> &WhatsAppNotifier {
        &self.notifier
    }

    /// Place an order for an existing customer.
    ///
    /// Names and prices come from the menu as it is now; the request only
    /// names items and quantities. The order is persisted in one write, so
    /// a failure leaves nothing behind.
    ///
    /// # Errors
    ///
    /// - `Validation` for malformed input or a negative total
    /// - `NotFound` if the customer or a menu item does not exist
    /// - `Unavailable` if a menu item is switched off
    /// - `Repository` if storage fails
    pub async fn create_order(
        &self,
        customer_id: CustomerId,
        request: &OrderRequest,
    ) -> Result<Placement, LedgerError> {
        let checked = request.check()?;

        let customer = self
            .customers
            .get(customer_id)
            .await?
            .ok_or(LedgerError::NotFound(Missing::Customer(customer_id)))?;

        let mut items = Vec::with_capacity(checked.lines.len());
        for (menu_item_id, quantity, note) in checked.lines {
            let menu_item = self
                .menu
                .get(menu_item_id)
                .await?
                .ok_or(LedgerError::NotFound(Missing::MenuItem(menu_item_id)))?;
            if !menu_item.available {
                return Err(LedgerError::Unavailable {
                    menu_item_id,
                    name: menu_item.name,
                });
            }
            items.push(LineItem::from_menu_item(&menu_item, quantity, note));
        }

        let totals = compute_totals(&items, checked.delivery_fee, checked.discount)
            .filter(|t| t.subtotal <= Money::MAX && t.total <= Money::MAX)
            .ok_or_else(|| ValidationErrors::single("items", format!("order total must not exceed {}", Money::MAX)))?;
        if totals.total.is_negative() {
            return Err(ValidationErrors::single("discount", "must not exceed subtotal plus delivery fee").into());
        }

        let new_order = NewOrder {
            customer: CustomerSnapshot::from(&customer),
            items,
            delivery_fee: checked.delivery_fee,
            discount: checked.discount,
            totals,
            payment_method: request.payment_method,
            note: checked.note,
            estimated_minutes: DEFAULT_ESTIMATED_MINUTES,
            placed_at: Utc::now(),
        };

        let order = self.orders.insert(new_order).await?;
        tracing::info!(
            order_id = %order.id,
            number = %order.number,
            customer_id = %customer_id,
            total = %order.total,
            "Order placed"
        );

        let notification = self.notifier.order_placed(&order);
        Ok(Placement { order, notification })
    }

    /// Move an order to `status`, recording it in the history.
    ///
    /// Under the permissive policy repeating the current status is allowed
    /// and still recorded. The write only succeeds if nobody else changed
    /// the order since it was read.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the order does not exist
    /// - `InvalidTransition` if the policy forbids the move
    /// - `Conflict` if a concurrent update won
    /// - `Repository` if storage fails
    pub async fn transition_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        note: Option<String>,
    ) -> Result<Transition, LedgerError> {
        let current = self
            .orders
            .get(order_id)
            .await?
            .ok_or(LedgerError::NotFound(Missing::Order(order_id)))?;

        if !self.policy.allows(current.status, status) {
            return Err(LedgerError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let mut updated = current.clone();
        updated.record_transition(status, note, Utc::now());

        let order = match self.orders.update_status(&updated, current.version).await {
            Ok(order) => order,
            Err(crate::store::RepositoryError::NotFound) => {
                return Err(LedgerError::NotFound(Missing::Order(order_id)));
            }
            Err(e) => return Err(e.into()),
        };
        tracing::info!(
            order_id = %order.id,
            number = %order.number,
            from = %current.status,
            to = %order.status,
            "Order status changed"
        );

        let notification = (current.status != order.status).then(|| self.notifier.status_changed(&order));
        Ok(Transition { order, notification })
    }

    /// Rebuild the store notification and remember that it was issued.
    ///
    /// # Errors
    ///
    /// `NotFound` if the order does not exist, `Repository` if storage fails.
    pub async fn resend_whatsapp(&self, order_id: OrderId) -> Result<Placement, LedgerError> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or(LedgerError::NotFound(Missing::Order(order_id)))?;

        let notification = self.notifier.order_placed(&order);
        let order = self.orders.mark_whatsapp_sent(order_id, &notification.url).await?;
        tracing::info!(order_id = %order.id, number = %order.number, "WhatsApp link issued");
        Ok(Placement { order, notification })
    }

    /// # Errors
    ///
    /// `NotFound` if the order does not exist, `Repository` if storage fails.
    pub async fn get(&self, order_id: OrderId) -> Result<Order, LedgerError> {
        self.orders
            .get(order_id)
            .await?
            .ok_or(LedgerError::NotFound(Missing::Order(order_id)))
    }

    /// # Errors
    ///
    /// `NotFound` if no order has this number, `Repository` if storage fails.
    pub async fn get_by_number(&self, number: OrderNumber) -> Result<Order, LedgerError> {
        self.orders
            .get_by_number(number)
            .await?
            .ok_or(LedgerError::NotFound(Missing::OrderNumber(number)))
    }

    /// # Errors
    ///
    /// `Repository` if storage fails.
    pub async fn list(&self, query: OrderQuery) -> Result<OrderPage, LedgerError> {
        Ok(self.orders.list(&query.normalized()).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures;

    struct Setup {
        ledger: OrderLedger,
        stores: Stores,
        customer: CustomerId,
        burger: MenuItemId,
        soda: MenuItemId,
    }

    async fn setup(policy: TransitionPolicy) -> Setup {
        let stores = Stores::in_memory();
        let customer = stores
            .customers
            .create(fixtures::profile_input().validate().unwrap(), None)
            .await
            .unwrap()
            .id;
        let burger = stores
            .menu
            .create(fixtures::menu_draft("X-Burger", 3590, crate::types::MenuCategory::Snacks))
            .await
            .unwrap()
            .id;
        let soda = stores
            .menu
            .create(fixtures::menu_draft("Refrigerante", 899, crate::types::MenuCategory::Drinks))
            .await
            .unwrap()
            .id;
        let ledger = OrderLedger::new(&stores, fixtures::notifier(), policy);
        Setup {
            ledger,
            stores,
            customer,
            burger,
            soda,
        }
    }

    fn request(items: &[(MenuItemId, u32)]) -> OrderRequest {
        OrderRequest {
            items: items
                .iter()
                .map(|&(menu_item_id, quantity)| LineItemRequest {
                    menu_item_id,
                    quantity,
                    note: None,
                })
                .collect(),
            payment_method: PaymentMethod::Pix,
            delivery_fee: Decimal::new(500, 2),
            discount: Decimal::ZERO,
            note: None,
        }
    }

    async fn order_count(stores: &Stores) -> u64 {
        stores.orders.list(&OrderQuery::default()).await.unwrap().total
    }

    #[tokio::test]
    async fn test_create_order_derives_totals_from_menu() {
        let s = setup(TransitionPolicy::Permissive).await;
        let placement = s
            .ledger
            .create_order(s.customer, &request(&[(s.burger, 1), (s.soda, 2)]))
            .await
            .unwrap();

        let order = placement.order;
        assert_eq!(order.subtotal, Money::from_cents(5388));
        assert_eq!(order.total, Money::from_cents(5888));
        assert_eq!(order.items[1].subtotal, Money::from_cents(1798));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.history.len(), 1);
        assert_eq!(order.customer.name, "Maria Souza");
        assert!(placement.notification.message.contains("#000001"));
    }

    #[tokio::test]
    async fn test_menu_price_changes_do_not_touch_placed_orders() {
        let s = setup(TransitionPolicy::Permissive).await;
        let placed = s.ledger.create_order(s.customer, &request(&[(s.burger, 1)])).await.unwrap();

        let draft = fixtures::menu_draft("X-Burger", 9990, crate::types::MenuCategory::Snacks);
        s.stores.menu.update(s.burger, draft).await.unwrap();

        let reloaded = s.ledger.get(placed.order.id).await.unwrap();
        assert_eq!(reloaded.items[0].unit_price, Money::from_cents(3590));
    }

    #[tokio::test]
    async fn test_sequential_orders_get_consecutive_numbers() {
        let s = setup(TransitionPolicy::Permissive).await;
        let mut numbers = Vec::new();
        for _ in 0..3 {
            let placement = s.ledger.create_order(s.customer, &request(&[(s.soda, 1)])).await.unwrap();
            numbers.push(placement.order.number.sequence());
        }
        assert_eq!(numbers, [numbers[0], numbers[0] + 1, numbers[0] + 2]);
    }

    #[tokio::test]
    async fn test_oversized_fee_is_a_validation_error() {
        let s = setup(TransitionPolicy::Permissive).await;
        let body = format!(
            r#"{{"items":[{{"menuItemId":{}, "quantity":1}}],"paymentMethod":"pix","deliveryFee":"79228162514264337593543950335"}}"#,
            s.burger
        );
        let request: OrderRequest = serde_json::from_str(&body).unwrap();

        let err = s.ledger.create_order(s.customer, &request).await.unwrap_err();
        assert!(matches!(&err, LedgerError::Validation(errors) if errors.contains("deliveryFee")));

        let mut request = request;
        request.delivery_fee = "100000000.00".parse().unwrap();
        request.discount = "100000000.00".parse().unwrap();
        let err = s.ledger.create_order(s.customer, &request).await.unwrap_err();
        assert!(
            matches!(&err, LedgerError::Validation(errors) if errors.contains("deliveryFee") && errors.contains("discount"))
        );
        assert_eq!(order_count(&s.stores).await, 0);
    }

    #[tokio::test]
    async fn test_total_beyond_column_is_rejected() {
        let s = setup(TransitionPolicy::Permissive).await;
        let err = s
            .ledger
            .create_order(s.customer, &request(&[(s.burger, u32::MAX)]))
            .await
            .unwrap_err();
        assert!(matches!(&err, LedgerError::Validation(errors) if errors.contains("items")));
        assert_eq!(order_count(&s.stores).await, 0);
    }

    #[tokio::test]
    async fn test_negative_zero_amounts_are_accepted() {
        let s = setup(TransitionPolicy::Permissive).await;
        let mut request = request(&[(s.burger, 1)]);
        request.delivery_fee = "-0".parse().unwrap();
        request.discount = "-0.00".parse().unwrap();

        let placement = s.ledger.create_order(s.customer, &request).await.unwrap();
        assert_eq!(placement.order.total, Money::from_cents(3590));
        assert!(!placement.order.delivery_fee.is_negative());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_orders_get_distinct_numbers() {
        let s = setup(TransitionPolicy::Permissive).await;
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let ledger = s.ledger.clone();
                let request = request(&[(s.soda, 1)]);
                let customer = s.customer;
                tokio::spawn(async move { ledger.create_order(customer, &request).await })
            })
            .collect();

        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap().unwrap().order.number.sequence());
        }
        numbers.sort_unstable();
        numbers.dedup();
        assert_eq!(numbers.len(), 32);
        assert_eq!(numbers[31] - numbers[0], 31);
        assert_eq!(order_count(&s.stores).await, 32);
    }

    #[tokio::test]
    async fn test_unavailable_item_persists_nothing() {
        let s = setup(TransitionPolicy::Permissive).await;
        s.stores.menu.set_available(s.soda, false).await.unwrap();

        let err = s
            .ledger
            .create_order(s.customer, &request(&[(s.burger, 1), (s.soda, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unavailable { menu_item_id, .. } if menu_item_id == s.soda));
        assert_eq!(order_count(&s.stores).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_customer_or_item_is_not_found() {
        let s = setup(TransitionPolicy::Permissive).await;

        let err = s
            .ledger
            .create_order(CustomerId::new(99), &request(&[(s.burger, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(Missing::Customer(_))));

        let err = s
            .ledger
            .create_order(s.customer, &request(&[(MenuItemId::new(404), 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(Missing::MenuItem(_))));
        assert_eq!(order_count(&s.stores).await, 0);
    }

    #[tokio::test]
    async fn test_validation_collects_fields() {
        let s = setup(TransitionPolicy::Permissive).await;
        let mut bad = request(&[(s.burger, 0)]);
        bad.delivery_fee = Decimal::new(-1, 0);

        let LedgerError::Validation(errors) = s.ledger.create_order(s.customer, &bad).await.unwrap_err() else {
            panic!("expected validation error");
        };
        assert!(errors.contains("items[0].quantity"));
        assert!(errors.contains("deliveryFee"));

        let empty = request(&[]);
        let LedgerError::Validation(errors) = s.ledger.create_order(s.customer, &empty).await.unwrap_err() else {
            panic!("expected validation error");
        };
        assert!(errors.contains("items"));
    }

    #[tokio::test]
    async fn test_negative_total_is_rejected() {
        let s = setup(TransitionPolicy::Permissive).await;
        let mut req = request(&[(s.soda, 1)]);
        req.discount = Decimal::new(5000, 2);

        let err = s.ledger.create_order(s.customer, &req).await.unwrap_err();
        assert!(matches!(err, LedgerError::Validation(ref e) if e.contains("discount")));
        assert_eq!(order_count(&s.stores).await, 0);
    }

    #[tokio::test]
    async fn test_confirming_twice_keeps_first_timestamp() {
        let s = setup(TransitionPolicy::Permissive).await;
        let order = s.ledger.create_order(s.customer, &request(&[(s.burger, 1)])).await.unwrap().order;

        let first = s
            .ledger
            .transition_status(order.id, OrderStatus::Confirmed, None)
            .await
            .unwrap();
        assert_eq!(first.order.history.len(), 2);
        assert_eq!(first.order.history[1].status, OrderStatus::Confirmed);
        let confirmed_at = first.order.confirmed_at.unwrap();
        assert!(first.notification.is_some());

        let second = s
            .ledger
            .transition_status(order.id, OrderStatus::Confirmed, None)
            .await
            .unwrap();
        assert_eq!(second.order.history.len(), 3);
        assert_eq!(second.order.confirmed_at, Some(confirmed_at));
        assert!(second.notification.is_none());
    }

    #[tokio::test]
    async fn test_permissive_allows_moving_backwards() {
        let s = setup(TransitionPolicy::Permissive).await;
        let order = s.ledger.create_order(s.customer, &request(&[(s.burger, 1)])).await.unwrap().order;
        s.ledger
            .transition_status(order.id, OrderStatus::Delivered, None)
            .await
            .unwrap();
        let back = s
            .ledger
            .transition_status(order.id, OrderStatus::Pending, Some("reaberto".to_string()))
            .await
            .unwrap();
        assert_eq!(back.order.status, OrderStatus::Pending);
        assert_eq!(back.order.history.last().unwrap().note, "reaberto");
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_illegal_moves() {
        let s = setup(TransitionPolicy::Strict).await;
        let order = s.ledger.create_order(s.customer, &request(&[(s.burger, 1)])).await.unwrap().order;

        let err = s
            .ledger
            .transition_status(order.id, OrderStatus::Delivered, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered
            }
        ));
        assert_eq!(s.ledger.get(order.id).await.unwrap().history.len(), 1);

        s.ledger
            .transition_status(order.id, OrderStatus::Cancelled, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_transition_unknown_order() {
        let s = setup(TransitionPolicy::Permissive).await;
        let err = s
            .ledger
            .transition_status(OrderId::new(77), OrderStatus::Confirmed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(Missing::Order(_))));
    }

    #[tokio::test]
    async fn test_resend_marks_whatsapp_sent() {
        let s = setup(TransitionPolicy::Permissive).await;
        let order = s.ledger.create_order(s.customer, &request(&[(s.burger, 1)])).await.unwrap().order;
        assert!(!order.whatsapp_sent);

        let resent = s.ledger.resend_whatsapp(order.id).await.unwrap();
        assert!(resent.order.whatsapp_sent);
        assert_eq!(resent.order.whatsapp_url.as_deref(), Some(resent.notification.url.as_str()));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Strict".parse::<TransitionPolicy>().unwrap(), TransitionPolicy::Strict);
        assert_eq!(" permissive ".parse::<TransitionPolicy>().unwrap(), TransitionPolicy::Permissive);
        assert!("lenient".parse::<TransitionPolicy>().is_err());
    }
}
