//! Cache store trait definition.

use async_trait::async_trait;

/// Abstracts the read-through cache in front of the index.
///
/// The cache is best-effort: every operation reports success as a boolean
/// (or an `Option` for reads) and never raises. There is no retry inside
/// the store; the event processor's invalidation policy tolerates failed
/// sets by deleting the key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store `value` under `key`. Returns `false` if the write failed.
    async fn set(&self, key: &str, value: &str) -> bool;

    /// Remove `key`. Returns `false` if the command failed (a missing key
    /// is not a failure).
    async fn del(&self, key: &str) -> bool;

    /// Fetch the value under `key`, or `None` when absent or on failure.
    async fn get(&self, key: &str) -> Option<String>;
}
