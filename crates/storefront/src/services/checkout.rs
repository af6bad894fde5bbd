//! Checkout: resolve the ordering customer, then place the order.

use serde::Deserialize;

use delivery_core::customer::CustomerProfileInput;
use delivery_core::ledger::{LedgerError, OrderLedger, OrderRequest, Placement};
use delivery_core::store::CustomerStore;
use delivery_core::CustomerId;

use crate::error::AppError;
use crate::models::CurrentCustomer;

/// Who is placing the order.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CheckoutCustomer {
    /// The customer logged in on this session.
    Session,
    /// A customer known by id. Must be the customer logged in on this session.
    Existing { id: CustomerId },
    /// Contact details typed at checkout.
    New { profile: CustomerProfileInput },
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckoutRequest {
    pub customer: CheckoutCustomer,
    pub order: OrderRequest,
}

pub struct CheckoutService<'a> {
    ledger: &'a OrderLedger,
    customers: &'a dyn CustomerStore,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(ledger: &'a OrderLedger, customers: &'a dyn CustomerStore) -> Self {
        Self { ledger, customers }
    }

    /// Place an order for the customer named in `request`.
    ///
    /// A new profile whose email matches the logged-in customer orders as
    /// that customer. Any other email goes through
    /// [`CustomerStore::resolve_guest`], so a guest never orders as, or
    /// sees the stored details of, an account with a password.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` when `Session` is chosen without a login, or
    ///   `Existing` names anyone but the logged-in customer
    /// - `Validation` for an invalid new profile
    /// - `Database(Conflict)` when a new profile uses an account's email
    /// - any [`LedgerError`] from placing the order
    pub async fn place(
        &self,
        session: Option<&CurrentCustomer>,
        request: &CheckoutRequest,
    ) -> Result<Placement, AppError> {
        let customer_id = match &request.customer {
            CheckoutCustomer::Session => {
                session
                    .ok_or_else(|| AppError::Unauthorized("log in to order with your account".to_string()))?
                    .id
            }
            CheckoutCustomer::Existing { id } => match session {
                Some(current) if current.id == *id => *id,
                _ => {
                    return Err(AppError::Unauthorized(
                        "log in as this customer to order with their account".to_string(),
                    ));
                }
            },
            CheckoutCustomer::New { profile } => {
                let profile = profile.validate().map_err(LedgerError::from)?;
                match session {
                    Some(current) if current.email == profile.email => current.id,
                    _ => self.customers.resolve_guest(profile).await?.id,
                }
            }
        };

        Ok(self.ledger.create_order(customer_id, &request.order).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::FixedOffset;
    use delivery_core::ledger::TransitionPolicy;
    use delivery_core::menu::MenuItemInput;
    use delivery_core::notify::WhatsAppNotifier;
    use delivery_core::store::{RepositoryError, Stores};
    use delivery_core::{Email, MenuCategory};
    use serde_json::json;

    use super::*;

    struct Setup {
        stores: Stores,
        ledger: OrderLedger,
        item: i32,
    }

    async fn setup() -> Setup {
        let stores = Stores::in_memory();
        let notifier = WhatsAppNotifier::new(
            "31 3333-4444",
            "Casa da Pizza",
            None,
            FixedOffset::west_opt(3 * 3600).unwrap(),
        );
        let ledger = OrderLedger::new(&stores, notifier, TransitionPolicy::default());

        let draft = MenuItemInput {
            name: "Pizza Margherita".to_string(),
            description: "Molho, mussarela e manjericão".to_string(),
            price: "45.00".parse().unwrap(),
            category: MenuCategory::Pizzas,
            image_url: None,
            available: true,
            prep_minutes: Some(25),
            ingredients: Vec::new(),
            notes: None,
        }
        .validate()
        .unwrap();
        let item = stores.menu.create(draft).await.unwrap().id.as_i32();

        Setup { stores, ledger, item }
    }

    fn request(customer: serde_json::Value, item: i32) -> CheckoutRequest {
        serde_json::from_value(json!({
            "customer": customer,
            "order": {
                "items": [{ "menuItemId": item, "quantity": 2 }],
                "paymentMethod": "pix",
                "deliveryFee": "5.00"
            }
        }))
        .unwrap()
    }

    fn new_profile() -> serde_json::Value {
        json!({
            "type": "new",
            "profile": {
                "name": "João Lima",
                "email": "joao@example.com",
                "phone": "31 91234-5678",
                "address": {
                    "street": "Av. Afonso Pena",
                    "number": "1000",
                    "neighborhood": "Centro",
                    "city": "Belo Horizonte",
                    "postalCode": "30130-001"
                }
            }
        })
    }

    #[tokio::test]
    async fn test_new_customer_is_reused_by_email() {
        let setup = setup().await;
        let checkout = CheckoutService::new(&setup.ledger, setup.stores.customers.as_ref());

        let first = checkout.place(None, &request(new_profile(), setup.item)).await.unwrap();
        let second = checkout.place(None, &request(new_profile(), setup.item)).await.unwrap();

        assert_eq!(first.order.customer.customer_id, second.order.customer.customer_id);
        assert_eq!(first.order.total.display_brl(), "R$ 95.00");
        let email = Email::parse("joao@example.com").unwrap();
        assert!(setup.stores.customers.find_by_email(&email).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_returning_guest_orders_with_typed_address() {
        let setup = setup().await;
        let checkout = CheckoutService::new(&setup.ledger, setup.stores.customers.as_ref());
        checkout.place(None, &request(new_profile(), setup.item)).await.unwrap();

        let mut moved = new_profile();
        moved["profile"]["address"]["street"] = json!("Rua da Bahia");
        let placed = checkout.place(None, &request(moved, setup.item)).await.unwrap();

        assert_eq!(placed.order.customer.address.street, "Rua da Bahia");
    }

    #[tokio::test]
    async fn test_session_checkout_requires_login() {
        let setup = setup().await;
        let checkout = CheckoutService::new(&setup.ledger, setup.stores.customers.as_ref());

        let err = checkout
            .place(None, &request(json!({ "type": "session" }), setup.item))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_existing_customer_requires_matching_session() {
        let setup = setup().await;
        let checkout = CheckoutService::new(&setup.ledger, setup.stores.customers.as_ref());
        let first = checkout.place(None, &request(new_profile(), setup.item)).await.unwrap();
        let id = first.order.customer.customer_id;

        let err = checkout
            .place(None, &request(json!({ "type": "existing", "id": id }), setup.item))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let stranger = CurrentCustomer {
            id: CustomerId::new(id.as_i32() + 1),
            email: Email::parse("outra@example.com").unwrap(),
            name: "Outra".to_string(),
        };
        let err = checkout
            .place(Some(&stranger), &request(json!({ "type": "existing", "id": id }), setup.item))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let owner = CurrentCustomer {
            id,
            email: Email::parse("joao@example.com").unwrap(),
            name: "João Lima".to_string(),
        };
        let placed = checkout
            .place(Some(&owner), &request(json!({ "type": "existing", "id": id }), setup.item))
            .await
            .unwrap();
        assert_eq!(placed.order.customer.customer_id, id);
    }

    #[tokio::test]
    async fn test_guest_cannot_order_as_registered_account() {
        let setup = setup().await;
        let profile: CustomerProfileInput = serde_json::from_value(new_profile()["profile"].clone()).unwrap();
        setup
            .stores
            .customers
            .create(profile.validate().unwrap(), Some("hash".to_string()))
            .await
            .unwrap();
        let checkout = CheckoutService::new(&setup.ledger, setup.stores.customers.as_ref());

        let err = checkout.place(None, &request(new_profile(), setup.item)).await.unwrap_err();
        assert!(matches!(err, AppError::Database(RepositoryError::Conflict(_))));
    }

    #[test]
    fn test_client_prices_are_rejected() {
        let body = json!({
            "customer": { "type": "session" },
            "order": {
                "items": [{ "menuItemId": 1, "quantity": 1, "price": "0.01" }],
                "paymentMethod": "cash"
            }
        });
        assert!(serde_json::from_value::<CheckoutRequest>(body).is_err());
    }
}
