//! Index store trait definition.
//!
//! This module defines the abstract interface for the document index,
//! allowing for different backend implementations (Elasticsearch,
//! OpenSearch, in-memory test doubles).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::StoreError;

/// Abstracts the document index the consumer writes product state into.
///
/// Implementations are injected into the event processor to enable
/// dependency injection and easy testing with mock implementations.
///
/// # Note on Document Creation
///
/// There is no separate `create` operation. `upsert` performs
/// create-or-replace: the document is written whether or not it already
/// exists. Create and update events are therefore handled identically.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Fetch a document by id.
    ///
    /// Returns the backend's full GET response body, which carries the
    /// stored fields under `_source`. An absent document is a value, not an
    /// error: a 404 yields `Ok` with an empty JSON object. Transport
    /// failures and non-success statuses other than 404 are errors.
    ///
    /// # Arguments
    ///
    /// * `index` - The index name
    /// * `id` - The document id
    async fn get(&self, index: &str, id: &str) -> Result<Value, StoreError>;

    /// Create or replace a document, retrying transient failures.
    ///
    /// Makes up to `max_retries` attempts, sleeping with exponential
    /// backoff (100 ms doubling) between attempts.
    ///
    /// # Returns
    ///
    /// `true` when the write was acknowledged, `false` once retries are
    /// exhausted. Failures are logged; the caller decides how to surface
    /// them.
    async fn upsert(&self, index: &str, id: &str, doc: &Value, max_retries: u32) -> bool;

    /// Delete a document by id.
    ///
    /// Does not retry. Deleting an absent document is considered
    /// successful. Returns `false` on failure after logging.
    async fn delete(&self, index: &str, id: &str) -> bool;
}
