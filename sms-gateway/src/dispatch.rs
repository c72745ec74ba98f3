//! Inbound message dispatch.
//!
//! Per request: authorize the sender, build the response, and on acceptance
//! issue the processing handoff. The decision is always made before either
//! the response or the handoff exists, and a rejected sender never reaches
//! the handoff.

use axum::http::StatusCode;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::auth::{is_authorized, AuthorizedSenders};
use crate::handoff::{HandoffOutcome, HandoffRunner};

pub const UNAUTHORIZED_MESSAGE: &str = "Phone number is not authorized";
pub const ACCEPTED_MESSAGE: &str = "Message is being processed!";

/// A single inbound message, alive only for the request that carried it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender: String,
    pub body: String,
}

impl InboundMessage {
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
        }
    }
}

/// Authorization outcome for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Authorized,
    Rejected,
}

/// JSON body returned to the messaging provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InboundReply {
    Accepted { status: &'static str },
    Rejected { error: &'static str },
}

/// Response produced by [`Dispatcher::handle_inbound`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundResponse {
    pub status: StatusCode,
    pub reply: InboundReply,
}

/// Everything that came out of handling one message.
#[derive(Debug)]
pub struct Dispatched {
    pub decision: Decision,
    pub response: InboundResponse,
    /// Present only for authorized messages.
    pub handoff: Option<JoinHandle<HandoffOutcome>>,
}

/// Authorizes inbound messages and hands accepted bodies to processing.
#[derive(Clone)]
pub struct Dispatcher {
    senders: AuthorizedSenders,
    runner: HandoffRunner,
}

impl Dispatcher {
    pub fn new(senders: AuthorizedSenders, runner: HandoffRunner) -> Self {
        Self { senders, runner }
    }

    pub fn runner(&self) -> &HandoffRunner {
        &self.runner
    }

    pub fn decide(&self, sender: &str) -> Decision {
        if is_authorized(&self.senders, sender) {
            Decision::Authorized
        } else {
            Decision::Rejected
        }
    }

    /// Handle one inbound message.
    ///
    /// Never waits on processing: the handoff is spawned and its handle
    /// returned alongside the already-built response.
    pub fn handle_inbound(&self, message: InboundMessage) -> Dispatched {
        let decision = self.decide(&message.sender);

        match decision {
            Decision::Rejected => {
                warn!(sender = %message.sender, "sms_sender_rejected");
                Dispatched {
                    decision,
                    response: InboundResponse {
                        status: StatusCode::UNAUTHORIZED,
                        reply: InboundReply::Rejected {
                            error: UNAUTHORIZED_MESSAGE,
                        },
                    },
                    handoff: None,
                }
            }
            Decision::Authorized => {
                let response = InboundResponse {
                    status: StatusCode::OK,
                    reply: InboundReply::Accepted {
                        status: ACCEPTED_MESSAGE,
                    },
                };

                info!(
                    sender = %message.sender,
                    body_length = message.body.len(),
                    "sms_handoff_issued"
                );
                let handoff = self.runner.dispatch(message.body);

                Dispatched {
                    decision,
                    response,
                    handoff: Some(handoff),
                }
            }
        }
    }
}
