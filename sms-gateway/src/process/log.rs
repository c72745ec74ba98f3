use anyhow::Result;
use futures::future::{BoxFuture, FutureExt};
use tracing::info;

use super::Processor;

/// Processor that records each message body in the structured log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProcessor;

impl Processor for LogProcessor {
    fn process(&self, body: String) -> BoxFuture<'_, Result<()>> {
        async move {
            info!(body = %body, body_length = body.len(), "sms_processed");
            Ok(())
        }
        .boxed()
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_processor_succeeds() {
        assert!(LogProcessor.process("hello".to_string()).await.is_ok());
        assert!(LogProcessor.process(String::new()).await.is_ok());
    }
}
