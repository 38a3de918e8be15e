//! Test utilities and fixtures for premium ledger integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use rusqlite::Connection;
use tempfile::TempDir;

pub use premium_ledger::admission::{self, OrderRequest};
pub use premium_ledger::config::StripeConfig;
pub use premium_ledger::db::{AppState, DbPool, create_pool, init_db, queries};
pub use premium_ledger::entitlements;
pub use premium_ledger::error::AppError;
pub use premium_ledger::handlers::{self, webhooks::common::{ApplyOutcome, apply_event}};
pub use premium_ledger::models::*;
pub use premium_ledger::payments::{CheckoutProvider, StripeClient};
pub use premium_ledger::util::ValidityPolicy;

pub const TEST_SECRET: &str = "test_server_secret";
pub const STRIPE_WEBHOOK_SECRET: &str = "whsec_test123secret456";
pub const BASE_URL: &str = "http://localhost:5000";
pub const ONE_DAY: i64 = 86400;

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// File-backed pool so every connection sees the same database.
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn setup_test_pool() -> (TempDir, DbPool) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("ledger.db");
    let pool = create_pool(path.to_str().unwrap()).expect("Failed to create pool");
    {
        let conn = pool.get().unwrap();
        init_db(&conn).expect("Failed to initialize schema");
    }
    (dir, pool)
}

pub fn stripe_client(webhook_secret: Option<&str>) -> StripeClient {
    StripeClient::new(
        &StripeConfig {
            secret_key: "sk_test_xxx".to_string(),
            webhook_secret: webhook_secret.map(String::from),
        },
        Duration::from_secs(1),
    )
    .unwrap()
}

pub fn test_state(pool: DbPool, checkout: CheckoutProvider, allow_simulated: bool) -> AppState {
    AppState {
        db: pool,
        base_url: BASE_URL.to_string(),
        server_secret: TEST_SECRET.to_string(),
        checkout,
        validity: ValidityPolicy::default(),
        allow_simulated_webhooks: allow_simulated,
    }
}

/// Router with stub checkout and simulated webhooks enabled.
pub fn stub_app() -> (TempDir, Router, AppState) {
    let (dir, pool) = setup_test_pool();
    let state = test_state(pool, CheckoutProvider::Stub, true);
    (dir, handlers::app(state.clone()), state)
}

/// Router with a Stripe client (never called over the network in tests)
/// and simulated webhooks disabled, as in production.
pub fn stripe_app() -> (TempDir, Router, AppState) {
    let (dir, pool) = setup_test_pool();
    let state = test_state(
        pool,
        CheckoutProvider::Stripe(stripe_client(Some(STRIPE_WEBHOOK_SECRET))),
        false,
    );
    (dir, handlers::app(state.clone()), state)
}

pub fn create_test_order(conn: &Connection, user_id: &str) -> Order {
    queries::create_order(
        conn,
        &CreateOrder {
            user_id: user_id.to_string(),
            plan: "premium".to_string(),
            price_cents: 399,
            currency: "usd".to_string(),
        },
    )
    .expect("Failed to create test order")
}

pub fn simulated_event(order_id: &str, outcome: PaymentOutcome) -> PaymentEvent {
    PaymentEvent {
        order_id: order_id.to_string(),
        outcome,
        provenance: Provenance::Simulated,
        provider_event_id: None,
    }
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn compute_stripe_signature(payload: &[u8], secret: &str, timestamp: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// `stripe-signature` header value for `payload` signed now.
pub fn stripe_signature_header(payload: &[u8], secret: &str) -> String {
    let timestamp = now().to_string();
    let signature = compute_stripe_signature(payload, secret, &timestamp);
    format!("t={},v1={}", timestamp, signature)
}

/// Stripe checkout session event carrying our order id in metadata.
pub fn stripe_session_event(
    event_type: &str,
    order_id: Option<&str>,
    payment_status: &str,
) -> serde_json::Value {
    let mut metadata = HashMap::from([("user_id", "42")]);
    if let Some(order_id) = order_id {
        metadata.insert("order_id", order_id);
    }
    serde_json::json!({
        "id": "evt_1TestStripeEvent",
        "type": event_type,
        "data": {
            "object": {
                "id": "cs_test_123",
                "object": "checkout.session",
                "payment_status": payment_status,
                "metadata": metadata,
            }
        }
    })
}

pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn authed_get_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}
