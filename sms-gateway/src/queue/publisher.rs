//! Async RabbitMQ publisher for handing off inbound messages.
//!
//! The publisher is shared across handoff tasks. It holds at most one
//! [`Link`] (connection plus channel) and replaces it on the next publish
//! once either side has dropped.

use std::sync::Arc;

use anyhow::{Context, Result};
use lapin::{
    options::{BasicPublishOptions, QueueDeclareOptions},
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::types::{InboundSms, INBOUND_SMS_QUEUE};

/// Async RabbitMQ publisher with connection management.
#[derive(Clone)]
pub struct Publisher {
    inner: Arc<PublisherInner>,
}

struct PublisherInner {
    url: String,
    link: Mutex<Option<Link>>,
}

/// An open connection and the channel publishes go through.
struct Link {
    connection: Connection,
    channel: Channel,
}

impl Link {
    async fn open(url: &str) -> Result<Self> {
        info!("rabbitmq_publisher_connecting");

        let connection = Connection::connect(url, ConnectionProperties::default())
            .await
            .context("Failed to connect to RabbitMQ")?;
        let channel = connection
            .create_channel()
            .await
            .context("Failed to create channel")?;

        channel
            .queue_declare(
                INBOUND_SMS_QUEUE,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .context("Failed to declare inbound sms queue")?;

        info!(queue = INBOUND_SMS_QUEUE, "rabbitmq_publisher_ready");

        Ok(Self {
            connection,
            channel,
        })
    }

    fn is_usable(&self) -> bool {
        self.connection.status().connected() && self.channel.status().connected()
    }

    async fn shut(self) {
        if let Err(e) = self.channel.close(200, "Normal shutdown").await {
            warn!(error = %e, "rabbitmq_channel_close_error");
        }
        if let Err(e) = self.connection.close(200, "Normal shutdown").await {
            warn!(error = %e, "rabbitmq_connection_close_error");
        }
    }
}

impl Publisher {
    /// Create a new publisher with the given RabbitMQ URL.
    ///
    /// No connection is made until the first publish.
    pub fn new(url: String) -> Self {
        Self {
            inner: Arc::new(PublisherInner {
                url,
                link: Mutex::new(None),
            }),
        }
    }

    /// Channel from the current link, opening a new link if it went stale.
    ///
    /// The lock is held across the reconnect so concurrent handoffs share a
    /// single new connection.
    async fn channel(&self) -> Result<Channel> {
        let mut link = self.inner.link.lock().await;

        if let Some(current) = link.as_ref() {
            if current.is_usable() {
                return Ok(current.channel.clone());
            }
            warn!("rabbitmq_publisher_link_stale");
        }

        let fresh = Link::open(&self.inner.url).await?;
        let channel = fresh.channel.clone();
        *link = Some(fresh);

        Ok(channel)
    }

    /// Publish an accepted message to the inbound_sms queue.
    pub async fn publish_sms(&self, sms: &InboundSms) -> Result<()> {
        let channel = self.channel().await?;

        let body = serde_json::to_vec(sms).context("Failed to serialize message")?;
        let message_id = sms.message_id();

        channel
            .basic_publish(
                "",
                INBOUND_SMS_QUEUE,
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default()
                    .with_delivery_mode(2) // Persistent
                    .with_content_type("application/json".into())
                    .with_message_id(message_id.clone().into()),
            )
            .await
            .context("Failed to publish to inbound sms queue")?
            .await
            .context("Failed to confirm publish")?;

        info!(
            queue = INBOUND_SMS_QUEUE,
            message_id = %message_id,
            body_length = body.len(),
            "rabbitmq_sms_published"
        );

        Ok(())
    }

    /// Close the connection gracefully. A later publish reconnects.
    pub async fn close(&self) {
        if let Some(link) = self.inner.link.lock().await.take() {
            link.shut().await;
        }

        info!("rabbitmq_publisher_closed");
    }
}
