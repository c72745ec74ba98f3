//! SMS gateway - inbound message webhook with sender allowlisting.
//!
//! The messaging provider posts each inbound SMS to `/sms`. Senders on the
//! `PHONES` allowlist get an immediate 200 and their message body is handed
//! to a [`Processor`] on a detached task; everyone else gets a 401.
//!
//! ## Architecture
//!
//! ```text
//! Provider → POST /sms → Dispatcher ─┬─ rejected → 401
//!                                    └─ accepted → 200, HandoffRunner → Processor
//! ```

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod handoff;
pub mod outbound;
pub mod process;
pub mod queue;
pub mod web;

// Re-export commonly used types
pub use auth::{is_authorized, AuthorizedSenders};
pub use config::Config;
pub use dispatch::{Decision, Dispatched, Dispatcher, InboundMessage, InboundResponse};
pub use handoff::{HandoffOutcome, HandoffRunner};
pub use outbound::{Messenger, SendError, TwilioMessenger};
pub use process::{LogProcessor, Processor, QueueProcessor};
pub use queue::{InboundSms, Publisher, INBOUND_SMS_QUEUE};
pub use web::{router, AppState};
