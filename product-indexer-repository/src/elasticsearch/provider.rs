//! Elasticsearch provider implementation.
//!
//! This module provides the concrete implementation of `IndexStore`
//! using the official Elasticsearch Rust client.

use async_trait::async_trait;
use elasticsearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    DeleteParts, Elasticsearch, GetParts, IndexParts,
};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::errors::StoreError;
use crate::interfaces::IndexStore;

/// Elasticsearch index store.
///
/// Wraps a single-node client and exposes the document operations the
/// event processor needs: GET with explicit absence, retried upsert (PUT),
/// and unretried DELETE.
///
/// # Example
///
/// ```ignore
/// use product_indexer_repository::{ElasticsearchStore, IndexStore};
///
/// let store = ElasticsearchStore::new("localhost", 9200)?;
/// let current = store.get("products", "P123").await?;
/// if current.get("_source").is_none() {
///     // document absent
/// }
/// ```
pub struct ElasticsearchStore {
    client: Elasticsearch,
}

impl ElasticsearchStore {
    /// Create a new store connected to `http://{host}:{port}`.
    ///
    /// # Returns
    ///
    /// * `Ok(ElasticsearchStore)` - A new store instance
    /// * `Err(StoreError)` - If transport setup fails
    pub fn new(host: &str, port: u16) -> Result<Self, StoreError> {
        let url = Url::parse(&format!("http://{}:{}", host, port))
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| StoreError::connection(e.to_string()))?;

        info!(host = %host, port = port, "Created Elasticsearch store");

        Ok(Self {
            client: Elasticsearch::new(transport),
        })
    }

    /// Delay before the next attempt after `failures` consecutive failures.
    ///
    /// 100 ms after the first failure, doubling for each one after that.
    fn backoff_delay(failures: u32) -> Duration {
        Duration::from_millis(100 * (1 << (failures - 1)))
    }

    /// Perform one PUT of the document, without retry.
    async fn try_put(&self, index: &str, id: &str, doc: &Value) -> Result<(), StoreError> {
        let response = self
            .client
            .index(IndexParts::IndexId(index, id))
            .body(doc)
            .send()
            .await
            .map_err(|e| StoreError::request(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::request(format!(
                "Upsert failed with status {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl IndexStore for ElasticsearchStore {
    async fn get(&self, index: &str, id: &str) -> Result<Value, StoreError> {
        let response = self
            .client
            .get(GetParts::IndexId(index, id))
            .send()
            .await
            .map_err(|e| StoreError::request(e.to_string()))?;

        let status = response.status_code();

        // Absent documents are a value, not an error.
        if status.as_u16() == 404 {
            debug!(index = %index, id = %id, "Document not found");
            return Ok(json!({}));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Get request failed");
            return Err(StoreError::request(format!(
                "Get failed with status {}: {}",
                status, body
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))
    }

    async fn upsert(&self, index: &str, id: &str, doc: &Value, max_retries: u32) -> bool {
        let mut failures = 0;

        loop {
            match self.try_put(index, id, doc).await {
                Ok(()) => {
                    debug!(index = %index, id = %id, "Document upserted");
                    return true;
                }
                Err(e) => {
                    failures += 1;
                    if failures >= max_retries {
                        error!(
                            index = %index,
                            id = %id,
                            attempts = failures,
                            error = %e,
                            "Failed to upsert document after retries"
                        );
                        return false;
                    }

                    let delay = Self::backoff_delay(failures);
                    warn!(
                        index = %index,
                        id = %id,
                        attempt = failures,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Upsert attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn delete(&self, index: &str, id: &str) -> bool {
        let response = match self.client.delete(DeleteParts::IndexId(index, id)).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(index = %index, id = %id, error = %e, "Delete request failed");
                return false;
            }
        };

        let status = response.status_code();

        // 404 is acceptable - the document may not exist.
        if !status.is_success() && status.as_u16() != 404 {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Delete request failed");
            return false;
        }

        debug!(index = %index, id = %id, "Document deleted");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_delay_doubles() {
        assert_eq!(ElasticsearchStore::backoff_delay(1), Duration::from_millis(100));
        assert_eq!(ElasticsearchStore::backoff_delay(2), Duration::from_millis(200));
        assert_eq!(ElasticsearchStore::backoff_delay(3), Duration::from_millis(400));
    }
}
