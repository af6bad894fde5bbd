//! Admin API: login, order management, menu and customers.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use delivery_core::MenuCategory;
use delivery_core::ledger::TransitionPolicy;
use delivery_core::store::Stores;
use delivery_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, TestClient, add_menu_item, guest_checkout, logged_in_admin, money,
};
use serde_json::json;

/// Place one guest order through the storefront and return its id.
async fn place_order(stores: &Stores) -> i64 {
    let pizza = add_menu_item(stores, "Pizza Margherita", "45.00", MenuCategory::Pizzas).await;
    let mut storefront = TestClient::storefront(stores);
    let placed = storefront
        .post("/api/orders", guest_checkout(pizza, 2, "joao@example.com", "31 91234-5678"))
        .await;
    assert_eq!(placed.status, StatusCode::CREATED, "{:?}", placed.body);
    let number = placed.body["order"]["number"].as_str().unwrap().parse().unwrap();
    let order = stores.orders.get_by_number(number).await.unwrap().unwrap();
    i64::from(order.id.as_i32())
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_requires_login() {
    let stores = Stores::in_memory();
    let mut admin = TestClient::admin(&stores, TransitionPolicy::Permissive);

    assert_eq!(admin.get("/api/orders").await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(admin.get("/api/menu").await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(admin.get("/api/customers").await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(admin.get("/api/auth/me").await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_first_admin_registration_then_closed() {
    let stores = Stores::in_memory();
    let mut admin = logged_in_admin(&stores, TransitionPolicy::Permissive).await;

    let me = admin.get("/api/auth/me").await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], ADMIN_EMAIL);

    let second = admin
        .post(
            "/api/auth/register",
            json!({ "name": "Outro", "email": "outro@example.com", "password": "senha-forte-2" }),
        )
        .await;
    assert_eq!(second.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_logout() {
    let stores = Stores::in_memory();
    let mut first = logged_in_admin(&stores, TransitionPolicy::Permissive).await;
    assert_eq!(
        first.send(Method::POST, "/api/auth/logout", None).await.status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(first.get("/api/orders").await.status, StatusCode::UNAUTHORIZED);

    let mut admin = TestClient::admin(&stores, TransitionPolicy::Permissive);
    let wrong = admin
        .post("/api/auth/login", json!({ "email": ADMIN_EMAIL, "password": "errada" }))
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let login = admin
        .post("/api/auth/login", json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(admin.get("/api/orders").await.status, StatusCode::OK);
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_status_change_notifies_customer() {
    let stores = Stores::in_memory();
    let id = place_order(&stores).await;
    let mut admin = logged_in_admin(&stores, TransitionPolicy::Permissive).await;

    let pending = admin.get("/api/orders/pending").await;
    assert_eq!(pending.status, StatusCode::OK);
    assert_eq!(pending.body["total"], 1);

    let updated = admin
        .patch(
            &format!("/api/orders/{id}/status"),
            json!({ "status": "confirmed", "note": "Pedido aceito" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{:?}", updated.body);
    assert_eq!(updated.body["order"]["status"], "confirmed");
    assert!(updated.body["order"]["confirmedAt"].is_string());
    assert_eq!(updated.body["order"]["history"].as_array().unwrap().len(), 2);

    let link = updated.body["whatsapp"]["url"].as_str().unwrap();
    assert!(link.starts_with("https://api.whatsapp.com/send?phone=5531912345678&text="));

    let same = admin
        .patch(&format!("/api/orders/{id}/status"), json!({ "status": "confirmed" }))
        .await;
    assert_eq!(same.status, StatusCode::OK);
    assert!(same.body["whatsapp"].is_null());

    let pending = admin.get("/api/orders/pending").await;
    assert_eq!(pending.body["total"], 0);
}

#[tokio::test]
async fn test_strict_policy_rejects_skipping_steps() {
    let stores = Stores::in_memory();
    let id = place_order(&stores).await;
    let mut admin = logged_in_admin(&stores, TransitionPolicy::Strict).await;

    let skipped = admin
        .patch(&format!("/api/orders/{id}/status"), json!({ "status": "delivered" }))
        .await;
    assert_eq!(skipped.status, StatusCode::BAD_REQUEST);

    let confirmed = admin
        .patch(&format!("/api/orders/{id}/status"), json!({ "status": "confirmed" }))
        .await;
    assert_eq!(confirmed.status, StatusCode::OK);
}

#[tokio::test]
async fn test_order_lookup_and_filters() {
    let stores = Stores::in_memory();
    let id = place_order(&stores).await;
    let mut admin = logged_in_admin(&stores, TransitionPolicy::Permissive).await;

    let order = admin.get(&format!("/api/orders/{id}")).await;
    assert_eq!(order.status, StatusCode::OK);
    assert_eq!(order.body["customer"]["email"], "joao@example.com");

    let number = order.body["number"].as_str().unwrap().to_string();
    let by_number = admin.get(&format!("/api/orders/number/{number}")).await;
    assert_eq!(by_number.body["id"].as_i64(), Some(id));

    let delivered = admin.get("/api/orders?status=delivered").await;
    assert_eq!(delivered.body["total"], 0);
    let pending = admin.get("/api/orders?status=pending").await;
    assert_eq!(pending.body["total"], 1);

    assert_eq!(admin.get("/api/orders/999").await.status, StatusCode::NOT_FOUND);

    let resent = admin.post(&format!("/api/orders/{id}/whatsapp"), json!({})).await;
    assert_eq!(resent.status, StatusCode::OK);
    assert!(resent.body["whatsapp"]["url"].is_string());
}

#[tokio::test]
async fn test_dashboard_counts_todays_orders() {
    let stores = Stores::in_memory();
    let id = place_order(&stores).await;
    let mut admin = logged_in_admin(&stores, TransitionPolicy::Permissive).await;

    let dashboard = admin.get("/api/orders/dashboard").await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert_eq!(dashboard.body["ordersToday"], 1);
    assert_eq!(dashboard.body["topItems"][0]["name"], "Pizza Margherita");
    assert_eq!(dashboard.body["topItems"][0]["quantity"], 2);

    admin
        .patch(&format!("/api/orders/{id}/status"), json!({ "status": "cancelled" }))
        .await;
    let dashboard = admin.get("/api/orders/dashboard").await;
    assert!(money(&dashboard.body["revenueToday"]).abs() < f64::EPSILON);
}

// ============================================================================
// Menu & Customers
// ============================================================================

#[tokio::test]
async fn test_menu_management() {
    let stores = Stores::in_memory();
    let mut admin = logged_in_admin(&stores, TransitionPolicy::Permissive).await;

    let created = admin
        .post(
            "/api/menu",
            json!({
                "name": "Coxinha",
                "description": "Frango com catupiry",
                "price": "8.50",
                "category": "snacks"
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    let id = created.body["id"].as_i64().unwrap();

    let hidden = admin
        .patch(&format!("/api/menu/{id}/availability"), json!({ "available": false }))
        .await;
    assert_eq!(hidden.status, StatusCode::OK);
    assert_eq!(hidden.body["available"], false);

    let invalid = admin
        .post(
            "/api/menu",
            json!({ "name": "", "description": "x", "price": "0", "category": "snacks" }),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let deleted = admin.send(Method::DELETE, &format!("/api/menu/{id}"), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert_eq!(admin.get(&format!("/api/menu/{id}")).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_customer_management() {
    let stores = Stores::in_memory();
    place_order(&stores).await;
    let mut admin = logged_in_admin(&stores, TransitionPolicy::Permissive).await;

    let customers = admin.get("/api/customers?search=joao").await;
    assert_eq!(customers.status, StatusCode::OK);
    assert_eq!(customers.body["total"], 1);
    let id = customers.body["customers"][0]["id"].as_i64().unwrap();

    let disabled = admin
        .patch(&format!("/api/customers/{id}/status"), json!({ "active": false }))
        .await;
    assert_eq!(disabled.status, StatusCode::OK);
    assert_eq!(disabled.body["active"], false);

    let inactive = admin.get("/api/customers?active=false").await;
    assert_eq!(inactive.body["total"], 1);
}
