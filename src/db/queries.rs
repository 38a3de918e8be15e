use chrono::Utc;
use rusqlite::{Connection, params};

use crate::error::Result;
use crate::id::EntityType;
use crate::models::*;

use super::from_row::{ENTITLEMENT_COLS, ORDER_COLS, ORDER_EVENT_COLS, query_all, query_one};

const SECONDS_PER_DAY: i64 = 86400;

fn now() -> i64 {
    Utc::now().timestamp()
}

// ============ Orders ============

/// Insert a new pending order with a freshly generated id.
pub fn create_order(conn: &Connection, input: &CreateOrder) -> Result<Order> {
    let id = EntityType::Order.gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO orders (id, user_id, plan, status, price_cents, currency, created_at)
         VALUES (?1, ?2, ?3, 'pending', ?4, ?5, ?6)",
        params![&id, &input.user_id, &input.plan, input.price_cents, &input.currency, now],
    )?;

    Ok(Order {
        id,
        user_id: input.user_id.clone(),
        plan: input.plan.clone(),
        status: OrderStatus::Pending,
        price_cents: input.price_cents,
        currency: input.currency.clone(),
        created_at: now,
        settled_at: None,
    })
}

/// Look up an order. Malformed ids are treated as unknown without a query.
pub fn get_order(conn: &Connection, id: &str) -> Result<Option<Order>> {
    if !EntityType::Order.is_valid_id(id) {
        return Ok(None);
    }
    query_one(
        conn,
        &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLS),
        &[&id],
    )
}

/// Snapshot of all orders, newest first.
pub fn list_orders(conn: &Connection) -> Result<Vec<Order>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM orders ORDER BY created_at DESC, id",
            ORDER_COLS
        ),
        &[],
    )
}

/// Atomically move a pending order to a terminal status.
///
/// Compare-and-swap on `status = 'pending'`: returns `Ok(false)` when the
/// order is unknown or already terminal, so a second writer can never
/// overwrite the first one's outcome.
pub fn try_settle_order(conn: &Connection, id: &str, status: OrderStatus, at: i64) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET status = ?1, settled_at = ?2 WHERE id = ?3 AND status = 'pending'",
        params![status.as_ref(), at, id],
    )?;
    Ok(affected > 0)
}

// ============ Entitlements ============

pub fn get_entitlement(conn: &Connection, user_id: &str) -> Result<Option<Entitlement>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM entitlements WHERE user_id = ?1",
            ENTITLEMENT_COLS
        ),
        &[&user_id],
    )
}

/// Write the user's entitlement, replacing any previous grant.
pub fn upsert_entitlement(conn: &Connection, entitlement: &Entitlement) -> Result<()> {
    conn.execute(
        "INSERT INTO entitlements (user_id, premium, plan, order_id, granted_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(user_id) DO UPDATE SET
            premium = excluded.premium,
            plan = excluded.plan,
            order_id = excluded.order_id,
            granted_at = excluded.granted_at,
            expires_at = excluded.expires_at",
        params![
            &entitlement.user_id,
            entitlement.premium as i32,
            &entitlement.plan,
            &entitlement.order_id,
            entitlement.granted_at,
            entitlement.expires_at,
        ],
    )?;
    Ok(())
}

// ============ Order Event Audit Trail ============

pub fn record_order_event(
    conn: &Connection,
    event: &PaymentEvent,
    result: EventResult,
    received_at: i64,
) -> Result<OrderEvent> {
    let id = EntityType::OrderEvent.gen_id();

    conn.execute(
        "INSERT INTO order_events (id, order_id, provenance, outcome, provider_event_id, result, received_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &id,
            &event.order_id,
            event.provenance.as_ref(),
            event.outcome.as_ref(),
            &event.provider_event_id,
            result.as_ref(),
            received_at,
        ],
    )?;

    Ok(OrderEvent {
        id,
        order_id: event.order_id.clone(),
        provenance: event.provenance,
        outcome: event.outcome,
        provider_event_id: event.provider_event_id.clone(),
        result,
        received_at,
    })
}

/// Events for one order, oldest first.
pub fn list_order_events(conn: &Connection, order_id: &str) -> Result<Vec<OrderEvent>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM order_events WHERE order_id = ?1 ORDER BY received_at, rowid",
            ORDER_EVENT_COLS
        ),
        &[&order_id],
    )
}

/// Purge audit trail rows older than the retention period.
/// Returns the number of deleted records.
pub fn purge_old_order_events(conn: &Connection, retention_days: i64) -> Result<usize> {
    let cutoff = now().saturating_sub(retention_days.saturating_mul(SECONDS_PER_DAY));
    let deleted = conn.execute(
        "DELETE FROM order_events WHERE received_at < ?1",
        params![cutoff],
    )?;
    Ok(deleted)
}
