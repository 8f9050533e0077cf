//! Product Indexer Main Entry Point
//!
//! This is the main binary for the indexing consumer. It consumes product
//! events from Kafka and applies them to Elasticsearch and Redis.

use dotenv::dotenv;
use product_indexer::metrics::LogCounters;
use product_indexer::{ConsumerConfig, ConsumerError, Dependencies};
use std::env;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("product_indexer=info,product_indexer_repository=info"));

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
        service_name = "product-indexer",
        service_version = env!("CARGO_PKG_VERSION"),
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> Result<(), ConsumerError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    info!("Starting product indexer");

    let config = ConsumerConfig::from_env();

    let deps = match Dependencies::new(&config).await {
        Ok(deps) => deps,
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    deps.consumer.subscribe()?;

    // Forward ctrl-c into a shutdown broadcast the consumer loop selects on.
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            let _ = signal_tx.send(());
        }
    });

    let counters = LogCounters::new();

    match deps
        .consumer
        .run(&deps.processor, &deps.dlq, &counters, shutdown_rx)
        .await
    {
        Ok(()) => {
            info!("Product indexer shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Product indexer failed");
            Err(e)
        }
    }
}
