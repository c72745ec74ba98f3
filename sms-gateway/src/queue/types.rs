//! Queue message types.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Queue name for authorized inbound message bodies.
pub const INBOUND_SMS_QUEUE: &str = "inbound_sms";

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Message body handed off for processing.
///
/// Only the body crosses the handoff boundary; the sender has already been
/// authorized and is not forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundSms {
    /// Raw message text
    pub body: String,
    /// Unix epoch seconds when the gateway accepted the message
    pub received_at: u64,
    /// Per-process acceptance counter
    #[serde(default)]
    pub sequence: u64,
}

impl InboundSms {
    pub fn new(body: String) -> Self {
        let received_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Self {
            body,
            received_at,
            sequence: NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Message ID used for broker-side tracking.
    ///
    /// Unique within a process for messages accepted in the same second.
    pub fn message_id(&self) -> String {
        format!(
            "sms-{}-{}-{}",
            self.received_at,
            std::process::id(),
            self.sequence
        )
    }
}
