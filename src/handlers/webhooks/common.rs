//! Common webhook processing for payment notifications.
//!
//! Every event source (the real provider, the simulated endpoint) implements
//! [`WebhookProvider`]. [`handle_webhook`] runs the pipeline: authenticate the
//! raw request, parse it into a typed [`PaymentEvent`], then [`apply_event`]
//! exactly once per order.

use axum::{body::Bytes, http::HeaderMap};
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::models::{
    Entitlement, EventResult, Order, OrderStatus, PaymentEvent, PaymentOutcome, Provenance,
};
use crate::util::ValidityPolicy;

/// Parsed webhook payload.
#[derive(Debug)]
pub enum WebhookEvent {
    /// Reports the outcome of one order's payment
    Payment(PaymentEvent),
    /// Valid event that does not affect any order (e.g., unrelated Stripe type)
    Ignored(String),
}

/// Trait for payment notification sources.
///
/// Implementors provide authentication and parsing; the shared pipeline
/// handles the ledger update.
pub trait WebhookProvider: Send + Sync {
    /// Source name for logging
    fn provider_name(&self) -> &'static str;

    fn provenance(&self) -> Provenance;

    /// Authenticate the raw request before anything is parsed or applied.
    fn authenticate(&self, headers: &HeaderMap, body: &Bytes) -> Result<()>;

    /// Parse the payload into a typed event. Unknown shapes are
    /// `AppError::Verification`.
    fn parse_event(&self, body: &Bytes) -> Result<WebhookEvent>;
}

/// What applying an event did.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The order left `pending`; `entitlement` is set when it was paid
    Applied {
        order: Order,
        entitlement: Option<Entitlement>,
    },
    /// The order was already terminal; nothing changed
    AlreadyTerminal { order: Order },
}

impl ApplyOutcome {
    pub fn order(&self) -> &Order {
        match self {
            Self::Applied { order, .. } | Self::AlreadyTerminal { order } => order,
        }
    }
}

/// Response body returned to the event source.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub ok: bool,
    /// "applied", "already_terminal" or "ignored"
    pub result: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

impl WebhookAck {
    fn ignored() -> Self {
        Self {
            ok: true,
            result: "ignored",
            order_id: None,
            status: None,
        }
    }
}

impl From<&ApplyOutcome> for WebhookAck {
    fn from(outcome: &ApplyOutcome) -> Self {
        Self {
            ok: true,
            result: match outcome {
                ApplyOutcome::Applied { .. } => "applied",
                ApplyOutcome::AlreadyTerminal { .. } => "already_terminal",
            },
            order_id: Some(outcome.order().id.clone()),
            status: Some(outcome.order().status),
        }
    }
}

/// Apply a verified payment event to its order.
///
/// Runs in a single `BEGIN IMMEDIATE` transaction: the order lookup, the
/// pending -> terminal transition, the entitlement grant and the audit row
/// commit together or not at all. Concurrent appliers serialize on the
/// database write lock, so the terminal check always sees the latest state.
///
/// - Unknown order: `AppError::UnknownOrder`, nothing written.
/// - Terminal order: `ApplyOutcome::AlreadyTerminal`, only the audit row is written.
pub fn apply_event(
    conn: &mut Connection,
    event: &PaymentEvent,
    policy: &ValidityPolicy,
) -> Result<ApplyOutcome> {
    let now = chrono::Utc::now().timestamp();
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let order = queries::get_order(&tx, &event.order_id)?
        .ok_or_else(|| AppError::UnknownOrder(event.order_id.clone()))?;

    if order.status.is_terminal() {
        queries::record_order_event(&tx, event, EventResult::AlreadyTerminal, now)?;
        tx.commit()?;
        tracing::info!(
            "Order {} already {}; ignoring {} {} event",
            order.id,
            order.status.as_ref(),
            event.provenance.as_ref(),
            event.outcome.as_ref()
        );
        return Ok(ApplyOutcome::AlreadyTerminal { order });
    }

    let status = event.outcome.target_status();
    if !queries::try_settle_order(&tx, &order.id, status, now)? {
        // Nothing else can write while we hold the immediate lock
        return Err(AppError::Internal(format!(
            "Order {} changed during settlement",
            order.id
        )));
    }

    let entitlement = match event.outcome {
        PaymentOutcome::Paid => {
            let entitlement = Entitlement {
                user_id: order.user_id.clone(),
                premium: true,
                plan: order.plan.clone(),
                order_id: order.id.clone(),
                granted_at: now,
                expires_at: policy.expires_at(&order.plan, now),
            };
            queries::upsert_entitlement(&tx, &entitlement)?;
            Some(entitlement)
        }
        PaymentOutcome::Failed => None,
    };

    queries::record_order_event(&tx, event, EventResult::Applied, now)?;
    tx.commit()?;

    tracing::info!(
        "Order {} settled as {} via {} event (user={}, expires_at={:?})",
        order.id,
        status.as_ref(),
        event.provenance.as_ref(),
        order.user_id,
        entitlement.as_ref().map(|e| e.expires_at)
    );

    Ok(ApplyOutcome::Applied {
        order: Order {
            status,
            settled_at: Some(now),
            ..order
        },
        entitlement,
    })
}

/// Run the full pipeline for one inbound notification.
pub fn handle_webhook<P: WebhookProvider>(
    provider: &P,
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<WebhookAck> {
    provider.authenticate(headers, body)?;

    let event = match provider.parse_event(body)? {
        WebhookEvent::Payment(event) => event,
        WebhookEvent::Ignored(reason) => {
            tracing::debug!("{} webhook ignored: {}", provider.provider_name(), reason);
            return Ok(WebhookAck::ignored());
        }
    };

    let mut conn = state.db.get()?;
    match apply_event(&mut conn, &event, &state.validity) {
        Ok(outcome) => Ok(WebhookAck::from(&outcome)),
        Err(AppError::UnknownOrder(order_id)) => {
            tracing::warn!(
                "{} webhook for unknown order {}",
                provider.provider_name(),
                order_id
            );
            Err(AppError::UnknownOrder(order_id))
        }
        Err(e) => Err(e),
    }
}
