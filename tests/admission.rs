//! Admission gate and order-facing HTTP endpoint tests

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use tower::ServiceExt;

fn request() -> OrderRequest {
    OrderRequest {
        user_id: "123456789".into(),
        plan: "premium".into(),
        price: 3.99,
        currency: "usd".into(),
    }
}

// ============ Gate ============

#[test]
fn test_bad_secret_writes_nothing() {
    let conn = setup_test_db();

    let result = admission::create_order(&conn, TEST_SECRET, "wrong", &request());
    assert!(matches!(result, Err(AppError::Unauthorized)));

    let result = admission::create_order(&conn, TEST_SECRET, "", &request());
    assert!(matches!(result, Err(AppError::Unauthorized)));

    assert!(queries::list_orders(&conn).unwrap().is_empty());
}

#[test]
fn test_bad_secret_wins_over_invalid_input() {
    let conn = setup_test_db();
    let mut bad = request();
    bad.user_id = String::new();

    let result = admission::create_order(&conn, TEST_SECRET, "wrong", &bad);
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[test]
fn test_valid_request_creates_pending_order() {
    let conn = setup_test_db();

    let order = admission::create_order(&conn, TEST_SECRET, TEST_SECRET, &request()).unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.user_id, "123456789");
    assert_eq!(order.price_cents, 399);

    let orders = queries::list_orders(&conn).unwrap();
    assert_eq!(orders, vec![order]);
}

#[test]
fn test_invalid_request_writes_nothing() {
    let conn = setup_test_db();
    let mut bad = request();
    bad.price = -5.0;

    let result = admission::create_order(&conn, TEST_SECRET, TEST_SECRET, &bad);
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert!(queries::list_orders(&conn).unwrap().is_empty());
}

// ============ POST /create-checkout-session ============

#[tokio::test]
async fn test_checkout_with_bad_secret_returns_401() {
    let (_dir, app, state) = stub_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/create-checkout-session",
            &json!({"secret": "nope", "user_id": "42"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let conn = state.db.get().unwrap();
    assert!(queries::list_orders(&conn).unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_without_secret_returns_401() {
    let (_dir, app, _state) = stub_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/create-checkout-session",
            &json!({"user_id": "42"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_checkout_stub_returns_pay_stub_url() {
    let (_dir, app, state) = stub_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/create-checkout-session",
            &json!({"secret": TEST_SECRET, "user_id": "42"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let order_id = json["order_id"].as_str().unwrap().to_string();
    assert_eq!(
        json["checkout_url"],
        format!("{}/pay_stub/{}", BASE_URL, order_id)
    );

    let conn = state.db.get().unwrap();
    let order = queries::get_order(&conn, &order_id).unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.plan, "premium");
    assert_eq!(order.price_cents, 399);
    assert_eq!(order.currency, "usd");
}

#[tokio::test]
async fn test_checkout_accepts_numeric_telegram_id() {
    let (_dir, app, state) = stub_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/create-checkout-session",
            &json!({
                "secret": TEST_SECRET,
                "telegram_id": 987654321,
                "plan": "pro",
                "price": 9.5,
                "currency": "EUR",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let conn = state.db.get().unwrap();
    let order = queries::get_order(&conn, json["order_id"].as_str().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(order.user_id, "987654321");
    assert_eq!(order.plan, "pro");
    assert_eq!(order.price_cents, 950);
    assert_eq!(order.currency, "eur");
}

#[tokio::test]
async fn test_checkout_missing_user_returns_400() {
    let (_dir, app, state) = stub_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/create-checkout-session",
            &json!({"secret": TEST_SECRET}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Bad request");

    let conn = state.db.get().unwrap();
    assert!(queries::list_orders(&conn).unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_mistyped_body_with_bad_secret_writes_nothing() {
    let (_dir, app, state) = stub_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/create-checkout-session",
            &json!({"secret": "bad", "user_id": "42", "price": "x"}),
        ))
        .await
        .unwrap();

    // Rejected by the body parser before the secret check
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let conn = state.db.get().unwrap();
    assert!(queries::list_orders(&conn).unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_malformed_json_returns_400() {
    let (_dir, app, _state) = stub_app();

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .method("POST")
                .uri("/create-checkout-session")
                .header("content-type", "application/json")
                .body(axum::body::Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============ Order endpoints ============

#[tokio::test]
async fn test_get_order() {
    let (_dir, app, state) = stub_app();
    let order = create_test_order(&state.db.get().unwrap(), "42");

    let response = app
        .clone()
        .oneshot(get_request(&format!("/order/{}", order.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], order.id);
    assert_eq!(json["status"], "pending");
    assert_eq!(json["user_id"], "42");

    let response = app
        .oneshot(get_request("/order/ord_00000000000000000000000000000000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_orders_requires_secret() {
    let (_dir, app, state) = stub_app();
    create_test_order(&state.db.get().unwrap(), "1");
    create_test_order(&state.db.get().unwrap(), "2");

    let response = app.clone().oneshot(get_request("/orders")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(authed_get_request("/orders", "wrong"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(authed_get_request("/orders", TEST_SECRET))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_pay_stub_page() {
    let (_dir, app, state) = stub_app();
    let order = create_test_order(&state.db.get().unwrap(), "42");

    let response = app
        .clone()
        .oneshot(get_request(&format!("/pay_stub/{}", order.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains(&order.id));
    assert!(text.contains("/webhook/simulate"));

    let response = app
        .oneshot(get_request("/pay_stub/ord_00000000000000000000000000000000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_banner_and_health() {
    let (_dir, app, _state) = stub_app();

    let response = app.clone().oneshot(get_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("running"));

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_return_pages_mention_order() {
    let (_dir, app, _state) = stub_app();

    let response = app
        .clone()
        .oneshot(get_request("/success?session_id=cs_test_1&order_id=ord_abc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("ord_abc"));

    let response = app.oneshot(get_request("/cancel")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("cancelled"));
}
