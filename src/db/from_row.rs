//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to rusqlite errors.
///
/// A corrupted status value surfaces as a query error instead of a panic.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const ORDER_COLS: &str =
    "id, user_id, plan, status, price_cents, currency, created_at, settled_at";

pub const ENTITLEMENT_COLS: &str = "user_id, premium, plan, order_id, granted_at, expires_at";

pub const ORDER_EVENT_COLS: &str =
    "id, order_id, provenance, outcome, provider_event_id, result, received_at";

// ============ FromRow Implementations ============

impl FromRow for Order {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Order {
            id: row.get(0)?,
            user_id: row.get(1)?,
            plan: row.get(2)?,
            status: parse_enum(row, 3, "status")?,
            price_cents: row.get(4)?,
            currency: row.get(5)?,
            created_at: row.get(6)?,
            settled_at: row.get(7)?,
        })
    }
}

impl FromRow for Entitlement {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Entitlement {
            user_id: row.get(0)?,
            premium: row.get::<_, i32>(1)? != 0,
            plan: row.get(2)?,
            order_id: row.get(3)?,
            granted_at: row.get(4)?,
            expires_at: row.get(5)?,
        })
    }
}

impl FromRow for OrderEvent {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(OrderEvent {
            id: row.get(0)?,
            order_id: row.get(1)?,
            provenance: parse_enum(row, 2, "provenance")?,
            outcome: parse_enum(row, 3, "outcome")?,
            provider_event_id: row.get(4)?,
            result: parse_enum(row, 5, "result")?,
            received_at: row.get(6)?,
        })
    }
}
