//! Consumer configuration loaded from environment variables.

use std::env;

/// Default Kafka broker address.
const DEFAULT_KAFKA_BROKERS: &str = "localhost:9092";

/// Default Kafka consumer group ID.
const DEFAULT_KAFKA_GROUP_ID: &str = "product-indexer";

/// Default topic carrying product events.
const DEFAULT_KAFKA_TOPIC: &str = "product-events";

/// Default dead-letter topic.
const DEFAULT_KAFKA_DLQ_TOPIC: &str = "product-events-dlq";

/// Default Elasticsearch host.
const DEFAULT_ELASTICSEARCH_HOST: &str = "localhost";

/// Default Elasticsearch port.
const DEFAULT_ELASTICSEARCH_PORT: u16 = 9200;

/// Default Redis host.
const DEFAULT_REDIS_HOST: &str = "localhost";

/// Default Redis port.
const DEFAULT_REDIS_PORT: u16 = 6379;

/// Runtime configuration for the indexing consumer.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub kafka_brokers: String,
    pub kafka_group_id: String,
    pub kafka_topic: String,
    pub kafka_dlq_topic: String,
    pub elasticsearch_host: String,
    pub elasticsearch_port: u16,
    pub redis_host: String,
    pub redis_port: u16,
}

impl ConsumerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `KAFKA_BROKERS`: Broker addresses (default: localhost:9092)
    /// - `KAFKA_GROUP_ID`: Consumer group ID (default: product-indexer)
    /// - `KAFKA_TOPIC`: Input topic (default: product-events)
    /// - `KAFKA_DLQ_TOPIC`: Dead-letter topic (default: product-events-dlq)
    /// - `ELASTICSEARCH_HOST` / `ELASTICSEARCH_PORT`: Index target
    /// - `REDIS_HOST` / `REDIS_PORT`: Cache target
    pub fn from_env() -> Self {
        Self {
            kafka_brokers: env::var("KAFKA_BROKERS")
                .unwrap_or_else(|_| DEFAULT_KAFKA_BROKERS.to_string()),
            kafka_group_id: env::var("KAFKA_GROUP_ID")
                .unwrap_or_else(|_| DEFAULT_KAFKA_GROUP_ID.to_string()),
            kafka_topic: env::var("KAFKA_TOPIC")
                .unwrap_or_else(|_| DEFAULT_KAFKA_TOPIC.to_string()),
            kafka_dlq_topic: env::var("KAFKA_DLQ_TOPIC")
                .unwrap_or_else(|_| DEFAULT_KAFKA_DLQ_TOPIC.to_string()),
            elasticsearch_host: env::var("ELASTICSEARCH_HOST")
                .unwrap_or_else(|_| DEFAULT_ELASTICSEARCH_HOST.to_string()),
            elasticsearch_port: env::var("ELASTICSEARCH_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_ELASTICSEARCH_PORT),
            redis_host: env::var("REDIS_HOST").unwrap_or_else(|_| DEFAULT_REDIS_HOST.to_string()),
            redis_port: env::var("REDIS_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_REDIS_PORT),
        }
    }
}
