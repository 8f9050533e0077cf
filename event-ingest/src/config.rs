//! Ingestion service configuration loaded from environment variables.

use std::env;
use std::time::Duration;

/// Default HTTP port.
const DEFAULT_PORT: u16 = 8081;

/// Default accept-queue capacity.
const DEFAULT_QUEUE_SIZE: usize = 10_000;

/// Default maximum batch size in events.
const DEFAULT_BATCH_SIZE: usize = 100;

/// Default maximum wait before a partial batch flushes, in milliseconds.
const DEFAULT_BATCH_WAIT_MS: u64 = 1000;

/// Default append-log directory.
const DEFAULT_LOG_DIR: &str = "./append-log";

/// Default downstream sink endpoint.
const DEFAULT_SINK_URL: &str = "http://localhost:9800/batches";

/// Runtime configuration for the ingestion service.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub port: u16,
    pub queue_size: usize,
    pub batch_size: usize,
    pub batch_wait: Duration,
    pub log_dir: String,
    pub sink_url: String,
}

impl IngestConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PORT`: HTTP listen port (default: 8081)
    /// - `QUEUE_SIZE`: Accept-queue capacity (default: 10000)
    /// - `BATCH_SIZE`: Flush threshold in events (default: 100)
    /// - `BATCH_WAIT_MS`: Flush timeout in milliseconds (default: 1000)
    /// - `LOG_DIR`: Append-log directory (default: ./append-log)
    /// - `SINK_URL`: Downstream endpoint batches are POSTed to
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            queue_size: env::var("QUEUE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_QUEUE_SIZE),
            batch_size: env::var("BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_BATCH_SIZE),
            batch_wait: Duration::from_millis(
                env::var("BATCH_WAIT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_BATCH_WAIT_MS),
            ),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string()),
            sink_url: env::var("SINK_URL").unwrap_or_else(|_| DEFAULT_SINK_URL.to_string()),
        }
    }
}
