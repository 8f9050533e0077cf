// Server module - HTTP server setup, startup replay, shutdown drain
pub mod handlers;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use self::state::AppState;
use crate::batcher::Batcher;
use crate::config::IngestConfig;
use crate::errors::IngestError;
use crate::log::AppendLog;
use crate::models::Event;
use crate::sink::BatchSink;

/// Create the Axum application router with all routes
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/events", post(handlers::post_event))
        .route("/health", get(handlers::health_check))
        .with_state(state)
}

/// Replay all pending on-disk batches, oldest first.
///
/// Each file is read, sent, and deleted on acknowledged delivery. A file
/// that cannot be read or is refused by the sink is logged and left in
/// place for the next cycle; replay continues with the next file.
///
/// Returns `(delivered, remaining)` counts.
pub async fn replay_pending(log: &AppendLog, sink: &dyn BatchSink) -> (usize, usize) {
    let pending = match log.list_pending() {
        Ok(pending) => pending,
        Err(e) => {
            error!(error = %e, "Failed to list pending batches");
            return (0, 0);
        }
    };

    if pending.is_empty() {
        info!("No pending batches to replay");
        return (0, 0);
    }

    info!(count = pending.len(), "Replaying pending batches");

    let mut delivered = 0;
    let mut remaining = 0;

    for filename in pending {
        let events = match log.read_batch(&filename) {
            Ok(events) => events,
            Err(e) => {
                error!(file = %filename, error = %e, "Skipping unreadable batch");
                remaining += 1;
                continue;
            }
        };

        if sink.send(&events).await {
            if let Err(e) = log.delete_batch(&filename) {
                warn!(file = %filename, error = %e, "Failed to delete replayed batch");
            }
            info!(file = %filename, events = events.len(), "Replayed batch");
            delivered += 1;
        } else {
            warn!(file = %filename, "Failed to replay batch, keeping file");
            remaining += 1;
        }
    }

    info!(delivered = delivered, remaining = remaining, "Replay complete");
    (delivered, remaining)
}

/// The ingestion server: HTTP surface, accept queue, batcher, append log.
pub struct IngestServer {
    config: IngestConfig,
    log: Arc<AppendLog>,
    sink: Arc<dyn BatchSink>,
}

impl IngestServer {
    /// Build the server. Opening the append log validates that the log
    /// directory is writable; failure here is fatal.
    pub fn new(config: IngestConfig, sink: Arc<dyn BatchSink>) -> Result<Self, IngestError> {
        let log = Arc::new(AppendLog::new(&config.log_dir)?);

        info!(
            port = config.port,
            queue_size = config.queue_size,
            batch_size = config.batch_size,
            "Ingestion server initialized"
        );

        Ok(Self { config, log, sink })
    }

    /// Run the server until ctrl-c.
    ///
    /// Startup order is strict: replay pending batches, start the batcher,
    /// start the queue consumer, and only then bind the listener. Shutdown
    /// reverses it: stop accepting, drain the queue into the batcher, stop
    /// the batcher (which flushes), exit.
    pub async fn run(self) -> Result<(), IngestError> {
        // 1. Replay must finish before any HTTP traffic is accepted.
        replay_pending(self.log.as_ref(), self.sink.as_ref()).await;

        // 2. Batcher.
        let mut batcher = Batcher::new(
            Arc::clone(&self.log),
            Arc::clone(&self.sink),
            self.config.batch_size,
            self.config.batch_wait,
        );
        batcher.start();

        // 3. Accept-queue consumer draining into the batcher.
        let (queue_tx, mut queue_rx) = mpsc::channel::<Event>(self.config.queue_size);
        let batcher_handle = batcher.handle();
        let consumer = tokio::spawn(async move {
            while let Some(event) = queue_rx.recv().await {
                batcher_handle.add_event(event);
            }
        });

        // 4. HTTP traffic.
        let app = create_app(AppState {
            queue_tx: queue_tx.clone(),
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| IngestError::config(format!("bind {}: {}", addr, e)))?;

        info!(addr = %addr, "Ingestion server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| IngestError::server(e.to_string()))?;

        // All request handlers are done; dropping the last sender lets the
        // queue consumer drain and exit, then the batcher flushes.
        drop(queue_tx);
        let _ = consumer.await;
        batcher.stop().await;

        info!("Ingestion server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received shutdown signal");
    }
}
