//! Webhook endpoint handlers.

use axum::{
    extract::{rejection::FormRejection, Form, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::dispatch::{Dispatcher, InboundMessage};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

// =============================================================================
// Ping
// =============================================================================

#[derive(Serialize)]
pub struct PingResponse {
    pub message: &'static str,
}

/// Liveness endpoint.
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { message: "pong" })
}

// =============================================================================
// SMS Webhook
// =============================================================================

/// Inbound SMS form payload.
///
/// The provider posts form-encoded data with capitalized field names.
/// Missing fields become empty strings and are left to the allowlist to
/// reject.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SmsForm {
    pub from: String,
    pub body: String,
}

impl SmsForm {
    /// Pick `From` and `Body` out of decoded form pairs.
    ///
    /// The first occurrence of a repeated field wins.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut from = None;
        let mut body = None;

        for (key, value) in pairs {
            match key.as_str() {
                "From" if from.is_none() => from = Some(value),
                "Body" if body.is_none() => body = Some(value),
                _ => {}
            }
        }

        Self {
            from: from.unwrap_or_default(),
            body: body.unwrap_or_default(),
        }
    }
}

impl From<SmsForm> for InboundMessage {
    fn from(form: SmsForm) -> Self {
        InboundMessage::new(form.from, form.body)
    }
}

/// SMS webhook endpoint.
///
/// Responds 401 for senders outside the allowlist and 200 otherwise; an
/// accepted body is handed off after the response is built and is never
/// awaited here. A body that is not a readable form carries no sender, so it
/// is rejected like any other unknown sender.
pub async fn sms_webhook(
    State(state): State<AppState>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> impl IntoResponse {
    let form = match form {
        Ok(Form(pairs)) => SmsForm::from_pairs(pairs),
        Err(rejection) => {
            warn!(
                status = rejection.status().as_u16(),
                error = %rejection.body_text(),
                "sms_webhook_unreadable_form"
            );
            SmsForm::default()
        }
    };

    info!(
        sender = %form.from,
        body_length = form.body.len(),
        "sms_webhook_received"
    );

    let dispatched = state.dispatcher.handle_inbound(form.into());

    (dispatched.response.status, Json(dispatched.response.reply))
}

// =============================================================================
// HTTP Webhook
// =============================================================================

/// Generic HTTP inbound endpoint.
///
/// Has no defined contract yet. It answers 501 and never reaches processing.
pub async fn http_webhook() -> impl IntoResponse {
    warn!("http_webhook_not_implemented");
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(json!({ "error": "Not implemented" })),
    )
}
