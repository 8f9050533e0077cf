//! Error types for the indexing consumer.

use product_indexer_repository::StoreError;
use thiserror::Error;

/// Errors that can occur in the indexing consumer.
#[derive(Error, Debug)]
pub enum ConsumerError {
    /// Kafka-related error.
    #[error("Kafka error: {0}")]
    KafkaError(String),

    /// Error parsing or decoding a record.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error from the index or cache store.
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ConsumerError {
    /// Create a Kafka error.
    pub fn kafka(msg: impl Into<String>) -> Self {
        Self::KafkaError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

impl From<rdkafka::error::KafkaError> for ConsumerError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        Self::KafkaError(err.to_string())
    }
}
