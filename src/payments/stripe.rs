use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::StripeConfig;
use crate::error::{AppError, Result, msg};
use crate::models::Order;

type HmacSha256 = Hmac<Sha256>;

const CHECKOUT_SESSIONS_URL: &str = "https://api.stripe.com/v1/checkout/sessions";

#[derive(Debug, Deserialize)]
struct CreateCheckoutSessionResponse {
    id: String,
    url: String,
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
    webhook_secret: Option<String>,
}

impl StripeClient {
    /// Maximum age of a webhook timestamp before it's rejected (in seconds).
    /// Stripe recommends 300 seconds (5 minutes).
    const WEBHOOK_TIMESTAMP_TOLERANCE_SECS: i64 = 300;

    /// Allowed clock skew for timestamps from the future.
    const WEBHOOK_FUTURE_SKEW_SECS: i64 = 60;

    /// `timeout` bounds every API call so a slow Stripe cannot pin a handler.
    pub fn new(config: &StripeConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            secret_key: config.secret_key.clone(),
            webhook_secret: config.webhook_secret.clone(),
        })
    }

    pub fn has_webhook_secret(&self) -> bool {
        self.webhook_secret.is_some()
    }

    /// Create a one-off Checkout Session for an order using inline price data.
    ///
    /// The order id travels in `metadata[order_id]` and comes back on every
    /// checkout webhook. Returns `(session_id, checkout_url)`.
    pub async fn create_checkout_session(
        &self,
        order: &Order,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<(String, String)> {
        let product_name = format!("Premium AI Report ({})", order.plan);
        let unit_amount = order.price_cents.to_string();

        let response = self
            .client
            .post(CHECKOUT_SESSIONS_URL)
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&[
                ("mode", "payment"),
                ("payment_method_types[0]", "card"),
                ("success_url", success_url),
                ("cancel_url", cancel_url),
                ("client_reference_id", order.id.as_str()),
                ("line_items[0][quantity]", "1"),
                ("line_items[0][price_data][currency]", order.currency.as_str()),
                ("line_items[0][price_data][unit_amount]", unit_amount.as_str()),
                ("line_items[0][price_data][product_data][name]", product_name.as_str()),
                ("metadata[order_id]", order.id.as_str()),
                ("metadata[user_id]", order.user_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::PaymentProvider(format!("Stripe API error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::PaymentProvider(format!(
                "Stripe API error ({}): {}",
                status, error_text
            )));
        }

        let session: CreateCheckoutSessionResponse = response.json().await.map_err(|e| {
            AppError::PaymentProvider(format!("Failed to parse Stripe response: {}", e))
        })?;

        Ok((session.id, session.url))
    }

    /// Verify a `stripe-signature` header (`t=timestamp,v1=signature`) against
    /// the raw request body.
    ///
    /// Returns `Ok(false)` for a well-formed header that does not match or is
    /// outside the timestamp tolerance, and `Err` for a malformed header or a
    /// missing webhook secret.
    pub fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> Result<bool> {
        let webhook_secret = self
            .webhook_secret
            .as_deref()
            .ok_or_else(|| AppError::Verification(msg::WEBHOOK_SECRET_NOT_CONFIGURED.into()))?;

        let mut timestamp = None;
        let mut signatures_v1 = Vec::new();

        for part in signature.split(',') {
            let part = part.trim();
            if let Some(t) = part.strip_prefix("t=") {
                timestamp = Some(t);
            } else if let Some(s) = part.strip_prefix("v1=") {
                signatures_v1.push(s);
            }
        }

        let timestamp_str = timestamp
            .ok_or_else(|| AppError::Verification(msg::INVALID_SIGNATURE_FORMAT.into()))?;
        if signatures_v1.is_empty() {
            return Err(AppError::Verification(msg::INVALID_SIGNATURE_FORMAT.into()));
        }

        let timestamp: i64 = timestamp_str
            .parse()
            .map_err(|_| AppError::Verification(msg::INVALID_TIMESTAMP_IN_SIGNATURE.into()))?;

        let age = chrono::Utc::now().timestamp() - timestamp;

        if age > Self::WEBHOOK_TIMESTAMP_TOLERANCE_SECS {
            tracing::warn!(
                "Stripe webhook rejected: timestamp too old (age={}s, max={}s)",
                age,
                Self::WEBHOOK_TIMESTAMP_TOLERANCE_SECS
            );
            return Ok(false);
        }

        if age < -Self::WEBHOOK_FUTURE_SKEW_SECS {
            tracing::warn!(
                "Stripe webhook rejected: timestamp in the future (age={}s)",
                age
            );
            return Ok(false);
        }

        let mut mac = HmacSha256::new_from_slice(webhook_secret.as_bytes())
            .map_err(|_| AppError::Internal(msg::INVALID_WEBHOOK_SECRET.into()))?;
        mac.update(timestamp_str.as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = hex::encode(mac.finalize().into_bytes());
        let expected_bytes = expected.as_bytes();

        // Stripe sends several v1 entries while a secret is being rolled.
        // Signature length is not secret (always 64 hex chars).
        Ok(signatures_v1.iter().any(|provided| {
            let provided_bytes = provided.as_bytes();
            expected_bytes.len() == provided_bytes.len()
                && bool::from(expected_bytes.ct_eq(provided_bytes))
        }))
    }
}

/// Generic Stripe webhook event - object is parsed based on event_type
#[derive(Debug, Deserialize)]
pub struct StripeWebhookEvent {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

// ============ checkout.session.* ============

#[derive(Debug, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    /// "paid", "unpaid" or "no_payment_required"
    pub payment_status: Option<String>,
    #[serde(default)]
    pub metadata: StripeMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub struct StripeMetadata {
    pub order_id: Option<String>,
}
