use axum::{extract::State, http::HeaderMap};

use crate::admission;
use crate::db::{AppState, queries};
use crate::error::{AppError, OptionExt, Result, msg};
use crate::extractors::{Json, Path};
use crate::models::{Order, OrderEvent};
use crate::util::extract_bearer_token;

/// Operator endpoints present the server secret as a bearer token.
fn require_secret(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let token = extract_bearer_token(headers).ok_or(AppError::Unauthorized)?;
    admission::authorize(&state.server_secret, token)
}

/// `GET /order/{order_id}`
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Order>> {
    let conn = state.db.get()?;
    let order = queries::get_order(&conn, &order_id)?.or_not_found(msg::ORDER_NOT_FOUND)?;
    Ok(Json(order))
}

/// `GET /orders`: snapshot of every order, newest first.
pub async fn list_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Order>>> {
    require_secret(&state, &headers)?;
    let conn = state.db.get()?;
    Ok(Json(queries::list_orders(&conn)?))
}

/// `GET /order/{order_id}/events`: audit trail of events applied to one order.
pub async fn list_order_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> Result<Json<Vec<OrderEvent>>> {
    require_secret(&state, &headers)?;
    let conn = state.db.get()?;
    queries::get_order(&conn, &order_id)?.or_not_found(msg::ORDER_NOT_FOUND)?;
    Ok(Json(queries::list_order_events(&conn, &order_id)?))
}
