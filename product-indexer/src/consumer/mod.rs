//! Kafka consumer for product events.

mod kafka_consumer;
mod messages;

pub use kafka_consumer::ProductStreamConsumer;
pub use messages::{ProductEvent, ProductEventType};
