pub mod common;
pub mod simulate;
pub mod stripe;

pub use simulate::handle_simulated_webhook;
pub use stripe::handle_stripe_webhook;

use axum::{Router, routing::post};

use crate::db::AppState;

/// Webhook routes. The simulated endpoint only exists when enabled.
pub fn router(allow_simulated: bool) -> Router<AppState> {
    let router = Router::new().route("/webhook/stripe", post(handle_stripe_webhook));

    if allow_simulated {
        router.route("/webhook/simulate", post(handle_simulated_webhook))
    } else {
        router
    }
}
