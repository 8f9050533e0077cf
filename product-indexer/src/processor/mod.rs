//! Event processor implementation.
//!
//! Applies one product event to the index and cache: idempotency check,
//! index mutation with retry, cache mutation with failure-driven
//! invalidation.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use product_indexer_repository::{CacheStore, IndexStore};
use serde_json::Value;

use crate::consumer::{ProductEvent, ProductEventType};

/// The index all product documents live in.
const PRODUCTS_INDEX: &str = "products";

/// Default number of upsert attempts before an event fails.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Result of running one event through the pipeline.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// The event was applied to the index (and cache).
    Applied,
    /// The event was stale and skipped. Skips are success: the offset is
    /// committed and nothing is mutated.
    Skipped,
    /// Processing failed; the caller routes the record to the DLQ.
    Failed(String),
}

/// Processor that applies product events to the index and cache.
pub struct EventProcessor {
    index: Arc<dyn IndexStore>,
    cache: Arc<dyn CacheStore>,
    max_retries: u32,
}

impl EventProcessor {
    /// Create a new processor with the default retry policy.
    pub fn new(index: Arc<dyn IndexStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self::with_max_retries(index, cache, DEFAULT_MAX_RETRIES)
    }

    /// Create a new processor with a custom retry budget for index writes.
    pub fn with_max_retries(
        index: Arc<dyn IndexStore>,
        cache: Arc<dyn CacheStore>,
        max_retries: u32,
    ) -> Self {
        Self {
            index,
            cache,
            max_retries,
        }
    }

    /// Apply one event.
    ///
    /// The pipeline is: fetch current document, idempotency decision,
    /// index mutation, cache mutation. A fetch error fails the event
    /// (transient, no skip). Cache failures never fail the event; a failed
    /// set invalidates the key instead so readers refetch from the index.
    #[instrument(skip(self, event), fields(event_id = %event.event_id, product_id = %event.product_id))]
    pub async fn process(&self, event: &ProductEvent) -> ProcessOutcome {
        let current = match self.index.get(PRODUCTS_INDEX, &event.product_id).await {
            Ok(doc) => doc,
            Err(e) => return ProcessOutcome::Failed(format!("fetch failed: {}", e)),
        };

        if !should_apply(event, &current) {
            info!(version = event.version, "Skipped event (stale version)");
            return ProcessOutcome::Skipped;
        }

        let index_ok = match event.event_type {
            ProductEventType::Delete => self.index.delete(PRODUCTS_INDEX, &event.product_id).await,
            _ => {
                self.index
                    .upsert(
                        PRODUCTS_INDEX,
                        &event.product_id,
                        &event.index_document(),
                        self.max_retries,
                    )
                    .await
            }
        };

        if !index_ok {
            return ProcessOutcome::Failed("index write failed after retries".to_string());
        }

        let key = event.cache_key();
        match event.event_type {
            ProductEventType::Delete => {
                if !self.cache.del(&key).await {
                    warn!(key = %key, "Cache delete failed");
                }
            }
            _ => {
                let body = event.data.to_string();
                if !self.cache.set(&key, &body).await {
                    // Invalidate so readers never see a stale body.
                    warn!(key = %key, "Cache set failed, invalidating key");
                    self.cache.del(&key).await;
                }
            }
        }

        ProcessOutcome::Applied
    }
}

/// Idempotency decision against the current indexed document.
///
/// The document is the raw GET response; stored fields live under
/// `_source`. An absent document always applies. Otherwise the event is
/// stale when its `version` is not newer, or failing that when its
/// `updated_at` is not newer (ISO-8601 UTC strings compare correctly as
/// strings).
pub fn should_apply(event: &ProductEvent, current: &Value) -> bool {
    let source = match current.get("_source") {
        Some(source) => source,
        None => return true,
    };

    if let Some(version) = source.get("version").and_then(Value::as_i64) {
        if event.version <= version {
            return false;
        }
    }

    if let Some(updated_at) = source.get("updated_at").and_then(Value::as_str) {
        if event.updated_at.as_str() <= updated_at {
            return false;
        }
    }

    true
}
