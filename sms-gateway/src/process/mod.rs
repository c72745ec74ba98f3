//! Message processing capability.
//!
//! The gateway treats processing as opaque: once a sender is authorized, the
//! raw body is handed to a [`Processor`] and the gateway never looks at the
//! result except to log it.
//!
//! ## Implementations
//!
//! ```text
//! LogProcessor   → structured log line (default)
//! QueueProcessor → inbound_sms queue (when CLOUDAMQP_URL is set)
//! ```

pub mod log;
pub mod queue;

use anyhow::Result;
use futures::future::BoxFuture;

pub use self::log::LogProcessor;
pub use self::queue::QueueProcessor;

/// Downstream processing of an authorized message body.
pub trait Processor: Send + Sync + 'static {
    /// Process a single message body.
    fn process(&self, body: String) -> BoxFuture<'_, Result<()>>;

    /// Short name used in log fields.
    fn name(&self) -> &'static str;
}
