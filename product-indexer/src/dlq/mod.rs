//! Dead-letter queue producer.
//!
//! Records that cannot be processed (poison payloads or events that
//! exhausted their retries) are published to the DLQ topic with the raw
//! payload and a reason. Publication is non-blocking and best-effort:
//! a DLQ failure is logged but never stops the consumer.

use rdkafka::{
    config::ClientConfig,
    producer::{BaseProducer, BaseRecord, Producer},
};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info};

use crate::errors::ConsumerError;

/// Producer for the dead-letter topic.
pub struct DlqProducer {
    producer: BaseProducer,
    topic: String,
}

impl DlqProducer {
    /// Create a new DLQ producer.
    ///
    /// # Arguments
    ///
    /// * `brokers` - Kafka broker addresses (comma-separated)
    /// * `topic` - The dead-letter topic
    pub fn new(brokers: &str, topic: &str) -> Result<Self, ConsumerError> {
        let producer: BaseProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| ConsumerError::kafka(e.to_string()))?;

        info!(topic = %topic, "Created DLQ producer");

        Ok(Self {
            producer,
            topic: topic.to_string(),
        })
    }

    /// Publish the original payload with a failure reason.
    pub fn publish(&self, original: &[u8], error_reason: &str) {
        let record = dlq_record(original, error_reason, chrono::Utc::now().timestamp());
        let payload = record.to_string();

        if let Err((e, _)) = self
            .producer
            .send(BaseRecord::<(), _>::to(&self.topic).payload(&payload))
        {
            error!(topic = %self.topic, error = %e, "Failed to publish to DLQ");
        }

        // Serve delivery callbacks without blocking the pipeline.
        self.producer.poll(Duration::ZERO);
    }
}

/// Build the DLQ record body.
pub fn dlq_record(original: &[u8], error_reason: &str, timestamp: i64) -> Value {
    json!({
        "original_event": String::from_utf8_lossy(original),
        "error_reason": error_reason,
        "timestamp": timestamp,
    })
}
