//! # Product Indexer Repository
//!
//! This crate provides traits and implementations for the stores the
//! indexing consumer writes to. It includes definitions for errors,
//! interfaces, and concrete implementations for Elasticsearch and Redis.

pub mod elasticsearch;
pub mod errors;
pub mod interfaces;
pub mod redis;

pub use crate::elasticsearch::ElasticsearchStore;
pub use crate::redis::RedisStore;
pub use errors::StoreError;
pub use interfaces::{CacheStore, IndexStore};
