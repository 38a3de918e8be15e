//! Plain-text pages for humans: the banner, the stub payment page and the
//! Stripe return URLs.

use axum::extract::State;
use serde::Deserialize;

use crate::db::{AppState, queries};
use crate::error::{OptionExt, Result, msg};
use crate::extractors::{Path, Query};

#[derive(Debug, Deserialize)]
pub struct ReturnParams {
    pub order_id: Option<String>,
}

pub async fn index() -> &'static str {
    "Premium report payment server is running."
}

/// `GET /pay_stub/{order_id}`: stand-in checkout page when Stripe is not configured.
pub async fn pay_stub(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<String> {
    let conn = state.db.get()?;
    let order = queries::get_order(&conn, &order_id)?.or_not_found(msg::ORDER_NOT_FOUND)?;

    if state.allow_simulated_webhooks {
        Ok(format!(
            "Demo payment page for order {}. To simulate payment call POST /webhook/simulate with {{\"orderId\":\"{}\",\"paid\":true}}",
            order.id, order.id
        ))
    } else {
        Ok(format!(
            "Demo payment page for order {}. Simulated payments are disabled on this server.",
            order.id
        ))
    }
}

pub async fn success(Query(params): Query<ReturnParams>) -> String {
    match params.order_id {
        Some(order_id) => format!(
            "Payment received for order {}. Return to the chat and use /redeem to get your report.",
            order_id
        ),
        None => "Payment received. Return to the chat and use /redeem to get your report.".into(),
    }
}

pub async fn cancel(Query(params): Query<ReturnParams>) -> String {
    match params.order_id {
        Some(order_id) => format!(
            "Payment for order {} was cancelled. Use /buy in the chat to try again.",
            order_id
        ),
        None => "Payment was cancelled. Use /buy in the chat to try again.".into(),
    }
}
