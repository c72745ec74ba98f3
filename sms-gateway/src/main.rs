//! SMS gateway server.
//!
//! This binary:
//! - Loads `.env`, then the sender allowlist and settings from the environment
//! - Serves the inbound SMS webhook
//! - Hands accepted message bodies off for processing
//! - Drains in-flight handoffs on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sms_gateway::config;
use sms_gateway::outbound::{self, Messenger};
use sms_gateway::{
    router, AppState, Config, Dispatcher, HandoffRunner, LogProcessor, Processor, Publisher,
    QueueProcessor, TwilioMessenger,
};

const STARTUP_MESSAGE: &str = "Logged ✅";
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    // Before logging init so RUST_LOG may come from .env
    let dotenv = config::load_dotenv()?;

    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("sms_gateway_starting");

    match &dotenv {
        Some(path) => info!(path = %path.display(), "dotenv_loaded"),
        None => warn!("dotenv_not_found_using_process_environment"),
    }

    let config = Config::from_env();
    info!(
        port = config.port,
        authorized_senders = config.authorized_senders.len(),
        handoff_concurrency = config.handoff_concurrency,
        queue_configured = config.cloudamqp_url.is_some(),
        twilio_configured = config.twilio.is_some(),
        "config_loaded"
    );

    if config.authorized_senders.is_empty() {
        warn!("no_authorized_senders_all_requests_will_be_rejected");
    }

    let publisher = config.cloudamqp_url.clone().map(Publisher::new);
    let processor: Arc<dyn Processor> = match &publisher {
        Some(publisher) => Arc::new(QueueProcessor::new(publisher.clone())),
        None => Arc::new(LogProcessor),
    };
    info!(processor = processor.name(), "processor_selected");

    let runner = HandoffRunner::new(processor, config.handoff_concurrency);
    let dispatcher = Dispatcher::new(config.authorized_senders.clone(), runner.clone());
    let app = router(AppState::new(dispatcher));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "sms_gateway_listening");

    if let Some(to) = &config.startup_notify_to {
        notify_startup(&config, to).await;
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!(in_flight = runner.in_flight(), "handoff_draining");
    if tokio::time::timeout(DRAIN_TIMEOUT, runner.drain()).await.is_err() {
        warn!(in_flight = runner.in_flight(), "handoff_drain_timed_out");
    }

    if let Some(publisher) = publisher {
        publisher.close().await;
    }

    info!("sms_gateway_shutdown_complete");

    Ok(())
}

/// Send the startup message; failures are logged and otherwise ignored.
async fn notify_startup(config: &Config, to: &str) {
    let messenger = match config.twilio.clone().map(TwilioMessenger::new).transpose() {
        Ok(messenger) => messenger,
        Err(e) => {
            warn!(error = %e, "twilio_client_init_failed");
            return;
        }
    };

    let messenger = messenger.as_ref().map(|m| m as &dyn Messenger);
    match outbound::notify(messenger, to, STARTUP_MESSAGE).await {
        Ok(()) => info!(to = %to, "startup_notification_sent"),
        Err(e) => warn!(to = %to, error = %e, "startup_notification_failed"),
    }
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("sms_gateway_shutting_down");
}
