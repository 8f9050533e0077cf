//! Redis provider implementation.
//!
//! This module provides the concrete implementation of `CacheStore` over a
//! single multiplexed Redis connection.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{info, warn};

use crate::interfaces::CacheStore;
use crate::StoreError;

/// Redis cache store.
///
/// Holds one multiplexed connection; clones of the connection share the
/// underlying TCP stream. If the connection breaks, subsequent commands
/// fail (returning `false`/`None`) until the driver re-establishes it.
/// There is no retry here; callers own their own recovery policy.
pub struct RedisStore {
    conn: redis::aio::MultiplexedConnection,
}

impl RedisStore {
    /// Connect to `redis://{host}:{port}`.
    ///
    /// Connection failure is surfaced to the caller; at service startup it
    /// is treated as fatal.
    pub async fn new(host: &str, port: u16) -> Result<Self, StoreError> {
        let client = redis::Client::open(format!("redis://{}:{}/", host, port))
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        info!(host = %host, port = port, "Connected to Redis");

        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn set(&self, key: &str, value: &str) -> bool {
        let mut conn = self.conn.clone();
        match conn.set::<_, _, ()>(key, value).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache SET failed");
                false
            }
        }
    }

    async fn del(&self, key: &str) -> bool {
        let mut conn = self.conn.clone();
        match conn.del::<_, i64>(key).await {
            Ok(_) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache DEL failed");
                false
            }
        }
    }

    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache GET failed");
                None
            }
        }
    }
}
