use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use serde::Deserialize;

use crate::db::AppState;
use crate::error::{AppError, Result, msg};
use crate::models::{PaymentEvent, PaymentOutcome, Provenance};

use super::common::{WebhookAck, WebhookEvent, WebhookProvider, handle_webhook};

/// Body of `POST /webhook/simulate`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SimulatedPayload {
    #[serde(alias = "orderId")]
    order_id: String,
    paid: bool,
}

/// Unsigned events for environments without a real payment provider.
///
/// Carries no cryptographic proof, so it is a capability: unless `enabled`,
/// every request is refused before the body is looked at.
pub struct SimulatedWebhookProvider {
    pub enabled: bool,
}

impl WebhookProvider for SimulatedWebhookProvider {
    fn provider_name(&self) -> &'static str {
        "simulate"
    }

    fn provenance(&self) -> Provenance {
        Provenance::Simulated
    }

    fn authenticate(&self, _headers: &HeaderMap, _body: &Bytes) -> Result<()> {
        if self.enabled {
            Ok(())
        } else {
            Err(AppError::Forbidden(msg::SIMULATION_DISABLED.into()))
        }
    }

    fn parse_event(&self, body: &Bytes) -> Result<WebhookEvent> {
        let payload: SimulatedPayload = serde_json::from_slice(body)
            .map_err(|e| AppError::Verification(format!("Invalid simulated event: {}", e)))?;

        Ok(WebhookEvent::Payment(PaymentEvent {
            order_id: payload.order_id,
            outcome: if payload.paid {
                PaymentOutcome::Paid
            } else {
                PaymentOutcome::Failed
            },
            provenance: self.provenance(),
            provider_event_id: None,
        }))
    }
}

/// Axum handler for simulated payment events.
pub async fn handle_simulated_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>> {
    let provider = SimulatedWebhookProvider {
        enabled: state.allow_simulated_webhooks,
    };
    handle_webhook(&provider, &state, &headers, &body).map(Json)
}
