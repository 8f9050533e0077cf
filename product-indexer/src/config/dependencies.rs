//! Dependency initialization and wiring for the indexing consumer.

use std::sync::Arc;
use tracing::info;

use product_indexer_repository::{ElasticsearchStore, RedisStore};

use crate::config::ConsumerConfig;
use crate::consumer::ProductStreamConsumer;
use crate::dlq::DlqProducer;
use crate::errors::ConsumerError;
use crate::processor::EventProcessor;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The Kafka consumer, subscribed lazily by the caller.
    pub consumer: ProductStreamConsumer,
    /// The per-event processor wired to the real stores.
    pub processor: EventProcessor,
    /// The dead-letter producer.
    pub dlq: DlqProducer,
}

impl Dependencies {
    /// Initialize all dependencies from the given configuration.
    ///
    /// Any failure here (client construction, Redis connection) is a fatal
    /// startup error; the binary exits with code 1.
    pub async fn new(config: &ConsumerConfig) -> Result<Self, ConsumerError> {
        info!(
            kafka_brokers = %config.kafka_brokers,
            kafka_topic = %config.kafka_topic,
            elasticsearch_host = %config.elasticsearch_host,
            redis_host = %config.redis_host,
            "Initializing dependencies"
        );

        let index = ElasticsearchStore::new(&config.elasticsearch_host, config.elasticsearch_port)
            .map_err(|e| {
                ConsumerError::config(format!("Failed to create Elasticsearch store: {}", e))
            })?;

        let cache = RedisStore::new(&config.redis_host, config.redis_port)
            .await
            .map_err(|e| ConsumerError::config(format!("Failed to connect to Redis: {}", e)))?;

        let processor = EventProcessor::new(Arc::new(index), Arc::new(cache));

        let consumer = ProductStreamConsumer::new(
            &config.kafka_brokers,
            &config.kafka_group_id,
            &config.kafka_topic,
        )?;

        let dlq = DlqProducer::new(&config.kafka_brokers, &config.kafka_dlq_topic)?;

        info!("Dependencies initialized");

        Ok(Self {
            consumer,
            processor,
            dlq,
        })
    }
}
