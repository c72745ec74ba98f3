//! Web server module for handling inbound webhooks.
//!
//! Handlers stay thin: they extract the payload, let the
//! [`Dispatcher`](crate::dispatch::Dispatcher) decide, and return at once.
//! Processing happens on detached handoff tasks.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{http_webhook, ping, sms_webhook, AppState, PingResponse, SmsForm};

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/sms", post(sms_webhook))
        .route("/api", post(http_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
