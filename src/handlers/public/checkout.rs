use axum::extract::State;
use serde::{Deserialize, Deserializer, Serialize};

use crate::admission::{self, OrderRequest};
use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;

const DEFAULT_PLAN: &str = "premium";
const DEFAULT_PRICE: f64 = 3.99;
const DEFAULT_CURRENCY: &str = "usd";

/// Purchase request from the front-end.
///
/// Every field is optional at the parsing stage, so a well-typed body with a
/// bad secret is reported as 401 even when fields are missing. A body that
/// does not parse at all (wrong field types, broken JSON) is a 400 before the
/// secret is looked at; either way nothing is written.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub secret: String,
    /// Chat user id; accepted as a string or a number
    #[serde(default, alias = "telegram_id", deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
    pub order_id: String,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Int(i64),
        UInt(u64),
    }

    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|v| match v {
            StringOrNumber::String(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::UInt(n) => n.to_string(),
        }),
    )
}

/// `POST /create-checkout-session`: admit a purchase, persist a pending order
/// and hand back the payment redirect.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let order = {
        let conn = state.db.get()?;
        admission::create_order(
            &conn,
            &state.server_secret,
            &request.secret,
            &OrderRequest {
                user_id: request.user_id.unwrap_or_default(),
                plan: request.plan.unwrap_or_else(|| DEFAULT_PLAN.to_string()),
                price: request.price.unwrap_or(DEFAULT_PRICE),
                currency: request
                    .currency
                    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            },
        )?
    };

    let checkout_url = state
        .checkout
        .create_checkout(&state.base_url, &order)
        .await
        .inspect_err(|_| {
            tracing::warn!("Checkout failed for order {}; order stays pending", order.id);
        })?;

    Ok(Json(CheckoutResponse {
        checkout_url,
        order_id: order.id,
    }))
}
