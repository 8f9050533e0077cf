//! Event Ingest Main Entry Point
//!
//! HTTP ingestion service: accepts events, stages them durably, batches
//! them, and forwards batches to the downstream sink.

use dotenv::dotenv;
use event_ingest::server::IngestServer;
use event_ingest::sink::HttpSink;
use event_ingest::{IngestConfig, IngestError};
use std::env;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("event_ingest=info"));

    let json_output = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }

    info!(
        service_name = "event-ingest",
        service_version = env!("CARGO_PKG_VERSION"),
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> Result<(), IngestError> {
    dotenv().ok();
    init_tracing();

    info!("Starting ingestion server");

    let config = IngestConfig::from_env();
    let sink = Arc::new(HttpSink::new(&config.sink_url));

    let server = match IngestServer::new(config, sink) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Failed to initialize ingestion server");
            return Err(e);
        }
    };

    match server.run().await {
        Ok(()) => {
            info!("Server shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Ingestion server failed");
            Err(e)
        }
    }
}
