//! Downstream delivery adapters.
//!
//! A sink makes exactly one delivery attempt and reports the outcome as a
//! boolean. It never retries, never mutates the batch, and holds no state;
//! retry policy lives with the batcher and the startup replay.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::Event;

/// Upper bound on a single delivery attempt.
const SINK_TIMEOUT: Duration = Duration::from_secs(30);

/// Best-effort synchronous delivery of a batch to a downstream endpoint.
#[async_trait]
pub trait BatchSink: Send + Sync {
    /// Send one batch. `true` means the sink acknowledged it.
    async fn send(&self, events: &[Event]) -> bool;
}

/// Production sink: POST the batch as a JSON array to a configured URL.
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SINK_TIMEOUT)
            .build()
            .expect("reqwest client with static configuration");

        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl BatchSink for HttpSink {
    async fn send(&self, events: &[Event]) -> bool {
        match self.client.post(&self.endpoint).json(events).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(events = events.len(), "Sink accepted batch");
                true
            }
            Ok(response) => {
                warn!(
                    status = %response.status(),
                    events = events.len(),
                    "Sink refused batch"
                );
                false
            }
            Err(e) => {
                warn!(error = %e, events = events.len(), "Sink request failed");
                false
            }
        }
    }
}

/// Simulation sink with an injectable failure rate (0.0–1.0).
///
/// Shares the `BatchSink` interface with production; used by tests and
/// load experiments.
pub struct RandomFailureSink {
    failure_rate: f64,
}

impl RandomFailureSink {
    pub fn new(failure_rate: f64) -> Self {
        Self {
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl BatchSink for RandomFailureSink {
    async fn send(&self, events: &[Event]) -> bool {
        // Simulated network delay.
        let delay_ms = rand::thread_rng().gen_range(10..50);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        if self.failure_rate > 0.0 && rand::thread_rng().gen_bool(self.failure_rate) {
            warn!(events = events.len(), "Simulated sink failure");
            return false;
        }

        debug!(events = events.len(), "Simulated sink success");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_event() -> Event {
        Event {
            id: "evt-1".to_string(),
            event_type: "test".to_string(),
            data: json!({"value": 1}),
            timestamp: 1234567890,
        }
    }

    #[tokio::test]
    async fn test_zero_failure_rate_always_succeeds() {
        let sink = RandomFailureSink::new(0.0);
        assert!(sink.send(&[test_event()]).await);
    }

    #[tokio::test]
    async fn test_full_failure_rate_always_fails() {
        let sink = RandomFailureSink::new(1.0);
        assert!(!sink.send(&[test_event()]).await);
    }

    #[test]
    fn test_failure_rate_is_clamped() {
        let sink = RandomFailureSink::new(7.5);
        assert_eq!(sink.failure_rate, 1.0);
    }
}
