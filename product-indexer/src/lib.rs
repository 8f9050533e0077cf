//! # Product Indexer
//!
//! Indexing consumer for the product search platform - consumes product
//! events from Kafka and applies them to Elasticsearch and Redis.
//!
//! ## Architecture
//!
//! Each event runs through a single-threaded pipeline:
//!
//! 1. **Consumer**: Receives one record at a time from Kafka
//! 2. **Processor**: Idempotency check, index mutation, cache mutation
//! 3. **Commit**: The offset is committed only after the pipeline finishes
//! 4. **DLQ**: Records that cannot be processed are routed to a
//!    dead-letter topic (and their offset committed, so poison messages
//!    are not retried)
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`consumer`]: Kafka consumer for product events
//! - [`processor`]: Applies events to the index and cache
//! - [`dlq`]: Dead-letter queue producer
//! - [`metrics`]: Narrow counter interface
//! - [`errors`]: Error types for the consumer

pub mod config;
pub mod consumer;
pub mod dlq;
pub mod errors;
pub mod metrics;
pub mod processor;

pub use config::{ConsumerConfig, Dependencies};
pub use errors::ConsumerError;
