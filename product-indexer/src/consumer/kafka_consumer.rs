//! Kafka consumer implementation for the indexing consumer.
//!
//! Consumes product events from Kafka one record at a time and drives the
//! per-event pipeline. Offsets are committed manually, only after the
//! pipeline has finished with the record (success, skip, or DLQ routing).

use rdkafka::{
    config::ClientConfig,
    consumer::{CommitMode, Consumer, StreamConsumer},
    message::{BorrowedMessage, Message as KafkaMessage},
};
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use crate::consumer::ProductEvent;
use crate::dlq::DlqProducer;
use crate::errors::ConsumerError;
use crate::metrics::Counters;
use crate::processor::{EventProcessor, ProcessOutcome};

/// Upper bound on the sleep applied after repeated transport errors.
const MAX_ERROR_BACKOFF_MS: u64 = 5000;

/// Kafka consumer for product events.
///
/// Processing is strictly sequential within this consumer: one record runs
/// the full pipeline before the next is fetched, which preserves per-key
/// ordering and makes the idempotency check sound.
pub struct ProductStreamConsumer {
    consumer: StreamConsumer,
    topic: String,
}

impl ProductStreamConsumer {
    /// Create a new Kafka consumer.
    ///
    /// # Arguments
    ///
    /// * `brokers` - Kafka broker addresses (comma-separated)
    /// * `group_id` - Consumer group ID
    /// * `topic` - Topic carrying product events
    ///
    /// # Returns
    ///
    /// * `Ok(ProductStreamConsumer)` - A new consumer instance
    /// * `Err(ConsumerError)` - If consumer creation fails
    pub fn new(brokers: &str, group_id: &str, topic: &str) -> Result<Self, ConsumerError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .create()
            .map_err(|e| ConsumerError::kafka(e.to_string()))?;

        info!(
            brokers = %brokers,
            group_id = %group_id,
            topic = %topic,
            "Created Kafka consumer"
        );

        Ok(Self {
            consumer,
            topic: topic.to_string(),
        })
    }

    /// Subscribe to the configured topic.
    pub fn subscribe(&self) -> Result<(), ConsumerError> {
        self.consumer
            .subscribe(&[self.topic.as_str()])
            .map_err(|e| ConsumerError::kafka(e.to_string()))?;

        info!(topic = %self.topic, "Subscribed to Kafka topic");
        Ok(())
    }

    /// Run the consumer loop until a shutdown signal arrives.
    ///
    /// Transport errors other than shutdown are logged and the loop
    /// continues; consecutive errors apply an increasing sleep to avoid
    /// spinning against a broken broker.
    #[instrument(skip_all)]
    pub async fn run(
        &self,
        processor: &EventProcessor,
        dlq: &DlqProducer,
        counters: &dyn Counters,
        mut shutdown: tokio::sync::broadcast::Receiver<()>,
    ) -> Result<(), ConsumerError> {
        info!("Starting consumer loop");
        let mut consecutive_errors: u32 = 0;

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Consumer received shutdown signal");
                    break;
                }
                result = self.consumer.recv() => match result {
                    Ok(msg) => {
                        consecutive_errors = 0;
                        self.handle_record(&msg, processor, dlq, counters).await;
                    }
                    Err(e) => {
                        error!(error = %e, "Kafka error");
                        consecutive_errors += 1;
                        tokio::time::sleep(error_backoff(consecutive_errors)).await;
                    }
                }
            }
        }

        info!("Consumer stopped");
        Ok(())
    }

    /// Run one record through the pipeline and settle its offset.
    ///
    /// Every path commits: success and skip directly, failures after DLQ
    /// routing. Poison messages are therefore never retried.
    async fn handle_record(
        &self,
        msg: &BorrowedMessage<'_>,
        processor: &EventProcessor,
        dlq: &DlqProducer,
        counters: &dyn Counters,
    ) {
        let payload = msg.payload().unwrap_or_default();

        let event = match ProductEvent::parse(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(
                    topic = %msg.topic(),
                    partition = msg.partition(),
                    offset = msg.offset(),
                    error = %e,
                    "Unparseable record, routing to DLQ"
                );
                dlq.publish(payload, &format!("parse error: {}", e));
                self.commit(msg);
                counters.incr("events_parse_error");
                return;
            }
        };

        match processor.process(&event).await {
            ProcessOutcome::Applied => {
                self.commit(msg);
                counters.incr("events_processed");
                info!(event_id = %event.event_id, "Successfully processed event");
            }
            ProcessOutcome::Skipped => {
                self.commit(msg);
                counters.incr("events_skipped");
            }
            ProcessOutcome::Failed(reason) => {
                error!(
                    event_id = %event.event_id,
                    reason = %reason,
                    "Processing failed, routing to DLQ"
                );
                dlq.publish(payload, &reason);
                self.commit(msg);
                counters.incr("events_failed");
            }
        }
    }

    fn commit(&self, msg: &BorrowedMessage<'_>) {
        if let Err(e) = self.consumer.commit_message(msg, CommitMode::Sync) {
            error!(
                topic = %msg.topic(),
                partition = msg.partition(),
                offset = msg.offset(),
                error = %e,
                "Failed to commit offset"
            );
        }
    }
}

/// Sleep applied after `consecutive` transport errors: 100 ms doubling,
/// capped at [`MAX_ERROR_BACKOFF_MS`].
fn error_backoff(consecutive: u32) -> Duration {
    let exp = consecutive.saturating_sub(1).min(16);
    Duration::from_millis((100u64 << exp).min(MAX_ERROR_BACKOFF_MS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_backoff_increases() {
        assert_eq!(error_backoff(1), Duration::from_millis(100));
        assert_eq!(error_backoff(2), Duration::from_millis(200));
        assert_eq!(error_backoff(3), Duration::from_millis(400));
    }

    #[test]
    fn test_error_backoff_is_capped() {
        assert_eq!(error_backoff(10), Duration::from_millis(MAX_ERROR_BACKOFF_MS));
        assert_eq!(error_backoff(100), Duration::from_millis(MAX_ERROR_BACKOFF_MS));
    }
}
