//! Sender authorization for inbound messages.

pub mod allowlist;

pub use allowlist::{is_authorized, AuthorizedSenders};
