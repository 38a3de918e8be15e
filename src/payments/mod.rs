mod stripe;

pub use stripe::*;

use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::models::Order;

/// Where new orders are sent to pay.
#[derive(Debug, Clone)]
pub enum CheckoutProvider {
    /// Real Stripe Checkout Session
    Stripe(StripeClient),
    /// Local demo page at `/pay_stub/{order_id}`, paid via `/webhook/simulate`
    Stub,
}

impl CheckoutProvider {
    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.stripe {
            Some(stripe) => Ok(Self::Stripe(StripeClient::new(
                stripe,
                Duration::from_secs(config.payment_timeout_secs),
            )?)),
            None => Ok(Self::Stub),
        }
    }

    pub fn stripe(&self) -> Option<&StripeClient> {
        match self {
            Self::Stripe(client) => Some(client),
            Self::Stub => None,
        }
    }

    /// Create the payment redirect for a pending order.
    ///
    /// A failure here leaves the order pending; the user can simply retry.
    pub async fn create_checkout(&self, base_url: &str, order: &Order) -> Result<String> {
        match self {
            Self::Stripe(client) => {
                let success_url = format!(
                    "{}/success?session_id={{CHECKOUT_SESSION_ID}}&order_id={}",
                    base_url, order.id
                );
                let cancel_url = format!("{}/cancel?order_id={}", base_url, order.id);
                let (session_id, url) = client
                    .create_checkout_session(order, &success_url, &cancel_url)
                    .await?;
                tracing::debug!(
                    "Stripe checkout session {} created for order {}",
                    session_id,
                    order.id
                );
                Ok(url)
            }
            Self::Stub => Ok(format!("{}/pay_stub/{}", base_url, order.id)),
        }
    }
}
