pub mod public;
pub mod webhooks;

use axum::Router;

use crate::db::AppState;

/// Full application router with state applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(public::router())
        .merge(webhooks::router(state.allow_simulated_webhooks))
        .with_state(state)
}
