//! Queue module for RabbitMQ operations.
//!
//! Used when processing is delegated to a downstream consumer:
//!
//! ```text
//! POST /sms → Dispatcher → QueueProcessor → inbound_sms queue → consumer
//! ```

pub mod publisher;
pub mod types;

pub use publisher::Publisher;
pub use types::{InboundSms, INBOUND_SMS_QUEUE};
