use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use super::OrderStatus;

/// Where a payment notification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Provenance {
    /// Unsigned event from `/webhook/simulate` (non-production only)
    Simulated,
    /// Signed event from the payment provider
    Provider,
}

/// Payment result reported by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentOutcome {
    Paid,
    Failed,
}

impl PaymentOutcome {
    pub fn target_status(&self) -> OrderStatus {
        match self {
            Self::Paid => OrderStatus::Paid,
            Self::Failed => OrderStatus::Failed,
        }
    }
}

/// What applying an event did to its order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventResult {
    /// The order transitioned from pending
    Applied,
    /// The order was already terminal; nothing changed
    AlreadyTerminal,
}

/// A verified, strongly-typed payment event ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
    pub order_id: String,
    pub outcome: PaymentOutcome,
    pub provenance: Provenance,
    /// Provider's event id (Stripe `evt_...`), kept for replay debugging
    pub provider_event_id: Option<String>,
}

/// Audit trail row for every event that reached a known order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub id: String,
    pub order_id: String,
    pub provenance: Provenance,
    pub outcome: PaymentOutcome,
    pub provider_event_id: Option<String>,
    pub result: EventResult,
    pub received_at: i64,
}
