use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};

use crate::db::AppState;
use crate::error::{AppError, Result, msg};
use crate::models::{PaymentEvent, PaymentOutcome, Provenance};
use crate::payments::{StripeCheckoutSession, StripeClient, StripeWebhookEvent};

use super::common::{WebhookAck, WebhookEvent, WebhookProvider, handle_webhook};

/// Stripe webhook provider implementation.
pub struct StripeWebhookProvider<'a> {
    client: &'a StripeClient,
}

impl<'a> StripeWebhookProvider<'a> {
    pub fn new(client: &'a StripeClient) -> Self {
        Self { client }
    }
}

impl WebhookProvider for StripeWebhookProvider<'_> {
    fn provider_name(&self) -> &'static str {
        "stripe"
    }

    fn provenance(&self) -> Provenance {
        Provenance::Provider
    }

    fn authenticate(&self, headers: &HeaderMap, body: &Bytes) -> Result<()> {
        let signature = headers
            .get("stripe-signature")
            .ok_or_else(|| AppError::Verification(msg::MISSING_SIGNATURE.into()))?
            .to_str()
            .map_err(|_| AppError::Verification(msg::INVALID_SIGNATURE_FORMAT.into()))?;

        if self.client.verify_webhook_signature(body, signature)? {
            Ok(())
        } else {
            Err(AppError::Verification(msg::INVALID_SIGNATURE.into()))
        }
    }

    fn parse_event(&self, body: &Bytes) -> Result<WebhookEvent> {
        let event: StripeWebhookEvent = serde_json::from_slice(body)
            .map_err(|e| AppError::Verification(format!("Invalid Stripe event: {}", e)))?;

        let outcome = match event.event_type.as_str() {
            "checkout.session.completed" => None,
            "checkout.session.async_payment_succeeded" => Some(PaymentOutcome::Paid),
            "checkout.session.async_payment_failed" | "checkout.session.expired" => {
                Some(PaymentOutcome::Failed)
            }
            other => return Ok(WebhookEvent::Ignored(format!("event type {}", other))),
        };

        let session: StripeCheckoutSession = serde_json::from_value(event.data.object)
            .map_err(|e| AppError::Verification(format!("Invalid checkout session: {}", e)))?;

        // checkout.session.completed fires for delayed payment methods too;
        // those settle later through async_payment_succeeded/failed.
        let outcome = match outcome {
            Some(outcome) => outcome,
            None => match session.payment_status.as_deref() {
                Some("paid") | Some("no_payment_required") => PaymentOutcome::Paid,
                other => {
                    return Ok(WebhookEvent::Ignored(format!(
                        "session {} completed with payment_status {:?}",
                        session.id, other
                    )));
                }
            },
        };

        let order_id = session
            .metadata
            .order_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::Verification(msg::MISSING_ORDER_ID.into()))?;

        Ok(WebhookEvent::Payment(PaymentEvent {
            order_id,
            outcome,
            provenance: self.provenance(),
            provider_event_id: event.id,
        }))
    }
}

/// Axum handler for Stripe webhooks.
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>> {
    let client = state
        .checkout
        .stripe()
        .ok_or_else(|| AppError::BadRequest(msg::STRIPE_NOT_CONFIGURED.into()))?;

    handle_webhook(&StripeWebhookProvider::new(client), &state, &headers, &body).map(Json)
}
