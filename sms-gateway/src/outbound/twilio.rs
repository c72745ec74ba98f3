//! Twilio Messages API client.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use super::{Messenger, SendError};
use crate::config::TwilioConfig;

const API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Sends SMS through the Twilio REST API.
#[derive(Clone)]
pub struct TwilioMessenger {
    client: Client,
    config: TwilioConfig,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

impl TwilioMessenger {
    pub fn new(config: TwilioConfig) -> Result<Self, SendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            config,
            api_base: API_BASE.to_string(),
        })
    }

    /// Point the client at a different API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    async fn deliver(&self, to: &str, body: &str) -> Result<(), SendError> {
        let form = [
            ("To", to),
            ("From", self.config.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(to = %to, status = status.as_u16(), "twilio_send_rejected");
            return Err(SendError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        match serde_json::from_str::<MessageResource>(&text) {
            Ok(message) => info!(to = %to, message_sid = %message.sid, "twilio_message_sent"),
            Err(e) => warn!(to = %to, error = %e, "twilio_response_unreadable"),
        }

        Ok(())
    }
}

impl Messenger for TwilioMessenger {
    fn send<'a>(&'a self, to: &'a str, body: &'a str) -> BoxFuture<'a, Result<(), SendError>> {
        self.deliver(to, body).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TwilioConfig {
        TwilioConfig {
            account_sid: "AC123".to_string(),
            auth_token: "secret".to_string(),
            from_number: "+15550000000".to_string(),
        }
    }

    #[test]
    fn test_messages_url() {
        let messenger = TwilioMessenger::new(config()).unwrap();
        assert_eq!(
            messenger.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );

        let messenger = messenger.with_api_base("http://localhost:9000/");
        assert_eq!(
            messenger.messages_url(),
            "http://localhost:9000/Accounts/AC123/Messages.json"
        );
    }

    #[tokio::test]
    async fn test_send_unreachable_host_is_http_error() {
        let messenger = TwilioMessenger::new(config())
            .unwrap()
            .with_api_base("http://127.0.0.1:1");

        let result = messenger.send("+15551234567", "hello").await;
        assert!(matches!(result, Err(SendError::Http(_))));
    }

    #[test]
    fn test_send_error_display() {
        let err = SendError::Rejected {
            status: 400,
            body: "bad number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "messaging provider rejected message with status 400: bad number"
        );
        assert_eq!(
            SendError::NotConfigured.to_string(),
            "outbound messaging is not configured"
        );
    }
}
