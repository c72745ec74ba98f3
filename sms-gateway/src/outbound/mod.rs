//! Outbound message delivery.
//!
//! The inbound path never sends; this is used for operator notifications
//! such as the startup message.

pub mod twilio;

use futures::future::BoxFuture;
use thiserror::Error;

pub use twilio::TwilioMessenger;

/// Errors from sending an outbound message.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("outbound messaging is not configured")]
    NotConfigured,

    #[error("request to messaging provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("messaging provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Capability to deliver a message to a recipient.
pub trait Messenger: Send + Sync {
    fn send<'a>(&'a self, to: &'a str, body: &'a str) -> BoxFuture<'a, Result<(), SendError>>;
}

/// Send through `messenger`, or fail with [`SendError::NotConfigured`].
pub async fn notify(
    messenger: Option<&dyn Messenger>,
    to: &str,
    body: &str,
) -> Result<(), SendError> {
    match messenger {
        Some(messenger) => messenger.send(to, body).await,
        None => Err(SendError::NotConfigured),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use futures::FutureExt;

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl Messenger for Outbox {
        fn send<'a>(&'a self, to: &'a str, body: &'a str) -> BoxFuture<'a, Result<(), SendError>> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            async { Ok(()) }.boxed()
        }
    }

    #[tokio::test]
    async fn test_notify_without_messenger() {
        let result = notify(None, "+15551234567", "hello").await;
        assert!(matches!(result, Err(SendError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_notify_sends() {
        let outbox = Outbox::default();
        notify(Some(&outbox), "+506 71099519", "Logged ✅")
            .await
            .unwrap();
        assert_eq!(
            *outbox.sent.lock().unwrap(),
            vec![("+506 71099519".to_string(), "Logged ✅".to_string())]
        );
    }
}
