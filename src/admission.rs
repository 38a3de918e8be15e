//! Admission gate: the shared-secret check that guards order creation.
//!
//! The front-end is the only trusted caller. Anything that mutates the ledger
//! on its behalf, or exposes the order book, goes through [`authorize`] first.

use rusqlite::Connection;
use subtle::ConstantTimeEq;

use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{CreateOrder, Order};

const MAX_USER_ID_LEN: usize = 128;
const MAX_PLAN_LEN: usize = 64;

/// Unvalidated purchase request as received from the front-end.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub user_id: String,
    pub plan: String,
    /// Major units (e.g., 3.99)
    pub price: f64,
    pub currency: String,
}

/// Check a caller-provided secret against the configured one.
///
/// Constant-time on the secret bytes; only the length comparison can short-circuit.
pub fn authorize(server_secret: &str, provided: &str) -> Result<()> {
    let expected = server_secret.as_bytes();
    let provided = provided.as_bytes();

    if expected.is_empty() || expected.len() != provided.len() {
        return Err(AppError::Unauthorized);
    }
    if bool::from(expected.ct_eq(provided)) {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

/// Authorize, validate and persist a new pending order.
///
/// Nothing is written unless the secret matches and the request is valid.
pub fn create_order(
    conn: &Connection,
    server_secret: &str,
    secret: &str,
    request: &OrderRequest,
) -> Result<Order> {
    authorize(server_secret, secret)?;
    let input = validate(request)?;
    let order = queries::create_order(conn, &input)?;

    tracing::info!(
        "Order created: id={}, user={}, plan={}, amount={} {}",
        order.id,
        order.user_id,
        order.plan,
        order.price_cents,
        order.currency
    );

    Ok(order)
}

fn validate(request: &OrderRequest) -> Result<CreateOrder> {
    let user_id = request.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::BadRequest("user_id is required".into()));
    }
    if user_id.len() > MAX_USER_ID_LEN {
        return Err(AppError::BadRequest(format!(
            "user_id must be at most {} characters",
            MAX_USER_ID_LEN
        )));
    }

    let plan = request.plan.trim();
    if plan.is_empty() || plan.len() > MAX_PLAN_LEN {
        return Err(AppError::BadRequest(format!(
            "plan must be 1-{} characters",
            MAX_PLAN_LEN
        )));
    }

    if !request.price.is_finite() || request.price < 0.0 {
        return Err(AppError::BadRequest(
            "price must be a non-negative number".into(),
        ));
    }
    let price_cents = (request.price * 100.0).round();
    if price_cents > i64::MAX as f64 {
        return Err(AppError::BadRequest("price is too large".into()));
    }

    let currency = request.currency.trim().to_lowercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(AppError::BadRequest(
            "currency must be a 3-letter ISO code".into(),
        ));
    }

    Ok(CreateOrder {
        user_id: user_id.to_string(),
        plan: plan.to_string(),
        price_cents: price_cents as i64,
        currency,
    })
}
