mod checkout;
mod orders;
mod pages;
mod status;

pub use checkout::*;
pub use orders::*;
pub use pages::*;
pub use status::*;

use axum::{Json, Router, routing::{get, post}};
use serde::Serialize;

use crate::db::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/create-checkout-session", post(create_checkout_session))
        .route("/orders", get(list_orders))
        .route("/order/{order_id}", get(get_order))
        .route("/order/{order_id}/events", get(list_order_events))
        .route("/user_status/{user_id}", get(user_status))
        .route("/pay_stub/{order_id}", get(pay_stub))
        .route("/success", get(success))
        .route("/cancel", get(cancel))
}
