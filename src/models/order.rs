use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Lifecycle state of an order. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// One purchase attempt, pending until the payment outcome is known.
/// Orders are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub plan: String,
    pub status: OrderStatus,
    /// Informational amount in minor units (cents)
    pub price_cents: i64,
    /// Lowercase ISO currency code (e.g., "usd")
    pub currency: String,
    pub created_at: i64,
    /// When the order reached a terminal status
    pub settled_at: Option<i64>,
}

/// Validated input for a new order.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub user_id: String,
    pub plan: String,
    pub price_cents: i64,
    pub currency: String,
}
