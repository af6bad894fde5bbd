//! In-process harness for the storefront and admin routers.
//!
//! Both apps run against the same in-memory [`Stores`], so an order placed
//! through the storefront is visible to the admin API. Requests go through
//! `tower::ServiceExt::oneshot`; no sockets or database are involved.
//!
//! ```bash
//! cargo test -p delivery-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::FixedOffset;
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use delivery_core::ledger::TransitionPolicy;
use delivery_core::menu::MenuItemInput;
use delivery_core::store::Stores;
use delivery_core::{MenuCategory, MenuItemId};

pub const STORE_WHATSAPP: &str = "31 3333-4444";
pub const ADMIN_EMAIL: &str = "gerente@example.com";
pub const ADMIN_PASSWORD: &str = "senha-forte-1";

static NEXT_CLIENT: AtomicU8 = AtomicU8::new(1);

/// Store settings as both apps would read them from the environment.
fn utc_minus_three() -> FixedOffset {
    FixedOffset::west_opt(3 * 3600).unwrap()
}

#[must_use]
pub fn storefront_config() -> delivery_storefront::config::StorefrontConfig {
    delivery_storefront::config::StorefrontConfig {
        database_url: SecretString::from("postgres://unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        allowed_origins: vec!["http://localhost:5173".to_string()],
        menu_cache_ttl: Duration::from_secs(60),
        store: delivery_storefront::config::StoreConfig {
            name: "Casa da Pizza".to_string(),
            whatsapp_number: STORE_WHATSAPP.to_string(),
            frontend_url: Some("https://pedidos.example.com".to_string()),
            utc_offset: utc_minus_three(),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

#[must_use]
pub fn admin_config(policy: TransitionPolicy) -> delivery_admin::config::AdminConfig {
    delivery_admin::config::AdminConfig {
        database_url: SecretString::from("postgres://unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3001,
        base_url: "http://localhost:3001".to_string(),
        allowed_origins: vec!["http://localhost:5174".to_string()],
        transition_policy: policy,
        store: delivery_admin::config::StoreConfig {
            name: "Casa da Pizza".to_string(),
            whatsapp_number: STORE_WHATSAPP.to_string(),
            frontend_url: Some("https://pedidos.example.com".to_string()),
            utc_offset: utc_minus_three(),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// `Value::Null` for empty bodies, a JSON string for plain text.
    pub body: Value,
}

/// One browser talking to one app: keeps its session cookie and client IP.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
    client_ip: String,
}

impl TestClient {
    fn new(router: Router) -> Self {
        let n = NEXT_CLIENT.fetch_add(1, Ordering::Relaxed);
        Self {
            router,
            cookie: None,
            client_ip: format!("10.0.0.{n}"),
        }
    }

    /// A storefront client over `stores`.
    #[must_use]
    pub fn storefront(stores: &Stores) -> Self {
        let state = delivery_storefront::state::AppState::new(storefront_config(), stores.clone());
        let sessions = delivery_storefront::middleware::session_layer(MemoryStore::default(), false);
        Self::new(delivery_storefront::app(state, sessions))
    }

    /// An admin client over `stores`.
    #[must_use]
    pub fn admin(stores: &Stores, policy: TransitionPolicy) -> Self {
        let state = delivery_admin::state::AppState::new(admin_config(policy), stores.clone());
        let sessions = delivery_admin::middleware::session_layer(MemoryStore::default(), false);
        Self::new(delivery_admin::app(state, sessions))
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn patch(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", &self.client_ip);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap_or_default();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse { status, body }
    }
}

/// Put an item on the menu directly through the repository.
pub async fn add_menu_item(stores: &Stores, name: &str, price: &str, category: MenuCategory) -> MenuItemId {
    let draft = MenuItemInput {
        name: name.to_string(),
        description: format!("{name} da casa"),
        price: price.parse().unwrap(),
        category,
        image_url: None,
        available: true,
        prep_minutes: Some(20),
        ingredients: Vec::new(),
        notes: None,
    }
    .validate()
    .unwrap();
    stores.menu.create(draft).await.unwrap().id
}

/// Customer profile JSON accepted at checkout and registration.
#[must_use]
pub fn profile(email: &str, phone: &str) -> Value {
    json!({
        "name": "João Lima",
        "email": email,
        "phone": phone,
        "address": {
            "street": "Av. Afonso Pena",
            "number": "1000",
            "neighborhood": "Centro",
            "city": "Belo Horizonte",
            "postalCode": "30130-001"
        }
    })
}

/// Guest checkout body for `quantity` units of `item`.
#[must_use]
pub fn guest_checkout(item: MenuItemId, quantity: u32, email: &str, phone: &str) -> Value {
    json!({
        "customer": { "type": "new", "profile": profile(email, phone) },
        "order": {
            "items": [{ "menuItemId": item.as_i32(), "quantity": quantity }],
            "paymentMethod": "pix",
            "deliveryFee": "5.00"
        }
    })
}

/// Parse a money string from a response for numeric comparison.
#[must_use]
pub fn money(value: &Value) -> f64 {
    value.as_str().unwrap().parse().unwrap()
}

/// Register the first admin and return a logged-in admin client.
pub async fn logged_in_admin(stores: &Stores, policy: TransitionPolicy) -> TestClient {
    let mut admin = TestClient::admin(stores, policy);
    let response = admin
        .post(
            "/api/auth/register",
            json!({ "name": "Gerente", "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    admin
}
