//! Storefront API: menu, checkout, tracking and customer accounts.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use delivery_core::MenuCategory;
use delivery_core::store::Stores;
use delivery_integration_tests::{TestClient, add_menu_item, guest_checkout, money, profile};
use serde_json::json;

// ============================================================================
// Health & Menu
// ============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let stores = Stores::in_memory();
    let mut client = TestClient::storefront(&stores);

    assert_eq!(client.get("/health").await.status, StatusCode::OK);
    assert_eq!(client.get("/health/ready").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_menu_listing_and_categories() {
    let stores = Stores::in_memory();
    add_menu_item(&stores, "Pizza Margherita", "45.00", MenuCategory::Pizzas).await;
    add_menu_item(&stores, "Guaraná", "6.00", MenuCategory::Drinks).await;
    let mut client = TestClient::storefront(&stores);

    let menu = client.get("/api/menu").await;
    assert_eq!(menu.status, StatusCode::OK);
    assert_eq!(menu.body.as_array().unwrap().len(), 2);

    let pizzas = client.get("/api/menu?category=pizzas").await;
    let pizzas = pizzas.body.as_array().unwrap();
    assert_eq!(pizzas.len(), 1);
    assert_eq!(pizzas[0]["name"], "Pizza Margherita");

    let categories = client.get("/api/menu/categories").await;
    assert_eq!(categories.status, StatusCode::OK);
    assert_eq!(categories.body.as_array().unwrap().len(), 2);

    assert_eq!(client.get("/api/menu/999").await.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_guest_checkout_prices_from_menu() {
    let stores = Stores::in_memory();
    let pizza = add_menu_item(&stores, "Pizza Margherita", "45.00", MenuCategory::Pizzas).await;
    let mut client = TestClient::storefront(&stores);

    let placed = client
        .post("/api/orders", guest_checkout(pizza, 2, "joao@example.com", "31 91234-5678"))
        .await;
    assert_eq!(placed.status, StatusCode::CREATED, "{:?}", placed.body);

    let order = &placed.body["order"];
    assert_eq!(order["status"], "pending");
    assert!((money(&order["subtotal"]) - 90.0).abs() < f64::EPSILON);
    assert!((money(&order["total"]) - 95.0).abs() < f64::EPSILON);
    assert_eq!(order["items"][0]["name"], "Pizza Margherita");
    assert_eq!(order["customerName"], "João Lima");
    assert!(order.get("customer").is_none());
    assert!(order.get("id").is_none());
    assert!(!order.to_string().contains("joao@example.com"));

    let number = order["number"].as_str().unwrap();
    assert_eq!(number.len(), 6);
    assert_eq!(placed.body["trackingUrl"], format!("/acompanhar/{number}"));

    let link = placed.body["whatsapp"]["url"].as_str().unwrap();
    assert!(link.starts_with("https://api.whatsapp.com/send?phone=553133334444&text="));
}

#[tokio::test]
async fn test_checkout_as_existing_customer_requires_matching_login() {
    let stores = Stores::in_memory();
    let pizza = add_menu_item(&stores, "Pizza Margherita", "45.00", MenuCategory::Pizzas).await;
    let mut owner = TestClient::storefront(&stores);
    let registered = owner
        .post(
            "/api/auth/register",
            json!({ "profile": profile("maria@example.com", "31 97777-1234"), "password": "segredo1" }),
        )
        .await;
    assert_eq!(registered.status, StatusCode::CREATED, "{:?}", registered.body);
    let id = owner.get("/api/account").await.body["id"].as_i64().unwrap();

    let body = json!({
        "customer": { "type": "existing", "id": id },
        "order": { "items": [{ "menuItemId": pizza.as_i32(), "quantity": 1 }], "paymentMethod": "pix" }
    });

    let mut stranger = TestClient::storefront(&stores);
    let refused = stranger.post("/api/orders", body.clone()).await;
    assert_eq!(refused.status, StatusCode::UNAUTHORIZED);
    assert!(!refused.body.to_string().contains("maria@example.com"));

    let placed = owner.post("/api/orders", body).await;
    assert_eq!(placed.status, StatusCode::CREATED, "{:?}", placed.body);
    assert!(placed.body["order"].get("customer").is_none());
}

#[tokio::test]
async fn test_guest_checkout_with_registered_email_is_refused() {
    let stores = Stores::in_memory();
    let pizza = add_menu_item(&stores, "Pizza Margherita", "45.00", MenuCategory::Pizzas).await;
    let mut owner = TestClient::storefront(&stores);
    owner
        .post(
            "/api/auth/register",
            json!({ "profile": profile("maria@example.com", "31 97777-1234"), "password": "segredo1" }),
        )
        .await;

    let mut stranger = TestClient::storefront(&stores);
    let refused = stranger
        .post("/api/orders", guest_checkout(pizza, 1, "maria@example.com", "31 95555-0000"))
        .await;
    assert_eq!(refused.status, StatusCode::CONFLICT);
    assert!(!refused.body.to_string().contains("97777"));

    let own = owner
        .post("/api/orders", guest_checkout(pizza, 1, "maria@example.com", "31 97777-1234"))
        .await;
    assert_eq!(own.status, StatusCode::CREATED, "{:?}", own.body);
}

#[tokio::test]
async fn test_returning_guest_orders_with_typed_address() {
    let stores = Stores::in_memory();
    let pizza = add_menu_item(&stores, "Pizza Margherita", "45.00", MenuCategory::Pizzas).await;
    let mut client = TestClient::storefront(&stores);
    let first = client
        .post("/api/orders", guest_checkout(pizza, 1, "joao@example.com", "31 91234-5678"))
        .await;
    assert_eq!(first.status, StatusCode::CREATED, "{:?}", first.body);

    let mut moved = guest_checkout(pizza, 1, "joao@example.com", "31 91234-5678");
    moved["customer"]["profile"]["address"]["street"] = json!("Rua da Bahia");
    let second = client.post("/api/orders", moved).await;
    assert_eq!(second.status, StatusCode::CREATED, "{:?}", second.body);

    let number = second.body["order"]["number"].as_str().unwrap().parse().unwrap();
    let order = stores.orders.get_by_number(number).await.unwrap().unwrap();
    assert_eq!(order.customer.address.street, "Rua da Bahia");
    assert!(!second.body["order"].to_string().contains("Rua da Bahia"));
}

#[tokio::test]
async fn test_checkout_rejects_client_prices() {
    let stores = Stores::in_memory();
    let pizza = add_menu_item(&stores, "Pizza Margherita", "45.00", MenuCategory::Pizzas).await;
    let mut client = TestClient::storefront(&stores);

    let mut body = guest_checkout(pizza, 1, "joao@example.com", "31 91234-5678");
    body["order"]["items"][0]["price"] = json!("0.01");

    let response = client.post("/api/orders", body).await;
    assert!(response.status.is_client_error());
    assert_eq!(stores.orders.list(&Default::default()).await.unwrap().total, 0);
}

#[tokio::test]
async fn test_checkout_validation_errors() {
    let stores = Stores::in_memory();
    let pizza = add_menu_item(&stores, "Pizza Margherita", "45.00", MenuCategory::Pizzas).await;
    stores.menu.set_available(pizza, false).await.unwrap();
    let mut client = TestClient::storefront(&stores);

    let unavailable = client
        .post("/api/orders", guest_checkout(pizza, 1, "joao@example.com", "31 91234-5678"))
        .await;
    assert_eq!(unavailable.status, StatusCode::BAD_REQUEST);

    let mut empty = guest_checkout(pizza, 1, "joao@example.com", "31 91234-5678");
    empty["order"]["items"] = json!([]);
    let response = client.post("/api/orders", empty).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["fields"].as_array().is_some_and(|f| !f.is_empty()));
}

// ============================================================================
// Tracking
// ============================================================================

#[tokio::test]
async fn test_tracking_by_number_and_contact() {
    let stores = Stores::in_memory();
    let pizza = add_menu_item(&stores, "Pizza Margherita", "45.00", MenuCategory::Pizzas).await;
    let mut client = TestClient::storefront(&stores);

    let placed = client
        .post("/api/orders", guest_checkout(pizza, 1, "ana@example.com", "(31) 98888-7777"))
        .await;
    let number = placed.body["order"]["number"].as_str().unwrap().to_string();

    let tracking = client.get(&format!("/api/tracking/{number}")).await;
    assert_eq!(tracking.status, StatusCode::OK);
    assert_eq!(tracking.body["status"], "pending");
    assert!(tracking.body.get("customer").is_none());

    let public = client.get(&format!("/api/orders/number/{number}")).await;
    assert_eq!(public.status, StatusCode::OK);
    assert!(public.body.get("customer").is_none());

    let found = client
        .post("/api/tracking/search", json!({ "phone": "31 98888-7777" }))
        .await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body.as_array().unwrap().len(), 1);

    let none = client.post("/api/tracking/search", json!({})).await;
    assert_eq!(none.status, StatusCode::BAD_REQUEST);

    assert_eq!(client.get("/api/tracking/abc").await.status, StatusCode::BAD_REQUEST);
    assert_eq!(client.get("/api/tracking/999999").await.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn test_account_flow() {
    let stores = Stores::in_memory();
    let pizza = add_menu_item(&stores, "Pizza Calabresa", "42.00", MenuCategory::Pizzas).await;
    let mut client = TestClient::storefront(&stores);

    assert_eq!(client.get("/api/account").await.status, StatusCode::UNAUTHORIZED);

    let registered = client
        .post(
            "/api/auth/register",
            json!({ "profile": profile("maria@example.com", "31 97777-1234"), "password": "segredo1" }),
        )
        .await;
    assert_eq!(registered.status, StatusCode::CREATED, "{:?}", registered.body);

    let account = client.get("/api/account").await;
    assert_eq!(account.status, StatusCode::OK);
    assert_eq!(account.body["email"], "maria@example.com");

    let placed = client
        .post(
            "/api/orders",
            json!({
                "customer": { "type": "session" },
                "order": { "items": [{ "menuItemId": pizza.as_i32(), "quantity": 1 }], "paymentMethod": "cash" }
            }),
        )
        .await;
    assert_eq!(placed.status, StatusCode::CREATED, "{:?}", placed.body);

    let history = client.get("/api/account/orders").await;
    assert_eq!(history.status, StatusCode::OK);
    assert_eq!(history.body["total"], 1);

    let logout = client.post("/api/auth/logout", json!({})).await;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);
    assert_eq!(client.get("/api/account").await.status, StatusCode::UNAUTHORIZED);

    let login = client
        .post("/api/auth/login", json!({ "email": "maria@example.com", "password": "segredo1" }))
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(client.get("/api/account").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let stores = Stores::in_memory();
    let mut client = TestClient::storefront(&stores);

    client
        .post(
            "/api/auth/register",
            json!({ "profile": profile("maria@example.com", "31 97777-1234"), "password": "segredo1" }),
        )
        .await;
    client.post("/api/auth/logout", json!({})).await;

    let login = client
        .post("/api/auth/login", json!({ "email": "maria@example.com", "password": "errado" }))
        .await;
    assert_eq!(login.status, StatusCode::UNAUTHORIZED);
}
