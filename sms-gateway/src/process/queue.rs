use anyhow::Result;
use futures::future::{BoxFuture, FutureExt};

use super::Processor;
use crate::queue::{InboundSms, Publisher};

/// Processor that forwards message bodies to the inbound_sms queue.
#[derive(Clone)]
pub struct QueueProcessor {
    publisher: Publisher,
}

impl QueueProcessor {
    pub fn new(publisher: Publisher) -> Self {
        Self { publisher }
    }
}

impl Processor for QueueProcessor {
    fn process(&self, body: String) -> BoxFuture<'_, Result<()>> {
        async move { self.publisher.publish_sms(&InboundSms::new(body)).await }.boxed()
    }

    fn name(&self) -> &'static str {
        "queue"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_processor_reports_broker_failure() {
        // Nothing listens on port 1, so the connect attempt fails fast.
        let processor = QueueProcessor::new(Publisher::new("amqp://127.0.0.1:1/%2f".to_string()));
        let result = processor.process("hello".to_string()).await;
        assert!(result.is_err());
    }
}
