//! Entitlement resolution: "is this user premium right now?"
//!
//! Expiry is lazy. Stored rows keep `premium = true` forever; the resolver
//! compares `expires_at` against the clock on every read, so no sweep job is
//! needed for correctness.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::Result;
use crate::models::{Entitlement, EntitlementStatus};

/// Resolve a stored entitlement (if any) at time `now`.
pub fn resolve(record: Option<Entitlement>, now: i64) -> EntitlementStatus {
    match record {
        Some(e) => EntitlementStatus {
            premium: e.premium && now < e.expires_at,
            plan: Some(e.plan),
            order_id: Some(e.order_id),
            expires_at: Some(e.expires_at),
        },
        None => EntitlementStatus::none(),
    }
}

/// Current entitlement status for `user_id`. Read-only.
pub fn premium_status(conn: &Connection, user_id: &str) -> Result<EntitlementStatus> {
    let record = queries::get_entitlement(conn, user_id)?;
    Ok(resolve(record, chrono::Utc::now().timestamp()))
}
