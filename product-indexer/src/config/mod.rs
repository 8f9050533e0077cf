//! Configuration and dependency initialization for the consumer.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::ConsumerConfig;
