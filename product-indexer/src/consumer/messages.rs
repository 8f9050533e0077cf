//! Message types for the consumer.
//!
//! Defines the product event structure that flows through the pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::errors::ConsumerError;

/// Types of product events that can be received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductEventType {
    /// Product was created.
    Create,
    /// Product was updated.
    Update,
    /// Product was deleted.
    Delete,
}

/// A product event received from Kafka.
///
/// `version` is monotonic per `product_id`; together with `updated_at`
/// (ISO-8601, comparable as a string) it drives the idempotency check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductEvent {
    /// Primary key into the index.
    pub product_id: String,
    /// Diagnostic identity of this event.
    pub event_id: String,
    /// The type of event.
    pub event_type: ProductEventType,
    /// Monotonic version for this product.
    pub version: i64,
    /// ISO-8601 timestamp of the change.
    pub updated_at: String,
    /// The product body.
    #[serde(default)]
    pub data: Value,
}

impl ProductEvent {
    /// Parse a raw record payload.
    ///
    /// Any malformed payload (bad JSON, missing required fields, unknown
    /// event type) is a parse error; the caller routes it to the DLQ.
    pub fn parse(payload: &[u8]) -> Result<Self, ConsumerError> {
        serde_json::from_slice(payload).map_err(|e| ConsumerError::parse(e.to_string()))
    }

    /// The cache key for this product.
    pub fn cache_key(&self) -> String {
        format!("product:{}", self.product_id)
    }

    /// The document to index: the event body merged with the identity and
    /// ordering fields.
    pub fn index_document(&self) -> Value {
        let mut doc = match &self.data {
            Value::Object(map) => map.clone(),
            other => {
                let mut map = Map::new();
                if !other.is_null() {
                    map.insert("data".to_string(), other.clone());
                }
                map
            }
        };

        doc.insert("product_id".to_string(), json!(self.product_id));
        doc.insert("version".to_string(), json!(self.version));
        doc.insert("updated_at".to_string(), json!(self.updated_at));

        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_event() {
        let payload = br#"{
            "product_id": "P123",
            "event_id": "evt-001",
            "event_type": "update",
            "version": 5,
            "updated_at": "2025-12-11T00:00:00Z",
            "data": {"title": "Test Product", "price": 99.99}
        }"#;

        let event = ProductEvent::parse(payload).unwrap();
        assert_eq!(event.product_id, "P123");
        assert_eq!(event.event_type, ProductEventType::Update);
        assert_eq!(event.version, 5);
        assert_eq!(event.cache_key(), "product:P123");
    }

    #[test]
    fn test_parse_rejects_bad_json() {
        assert!(ProductEvent::parse(b"this is not json").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        assert!(ProductEvent::parse(br#"{"product_id": "P1"}"#).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_event_type() {
        let payload = br#"{
            "product_id": "P1",
            "event_id": "evt-1",
            "event_type": "patch",
            "version": 1,
            "updated_at": "2025-12-11T00:00:00Z",
            "data": {}
        }"#;
        assert!(ProductEvent::parse(payload).is_err());
    }

    #[test]
    fn test_index_document_merges_identity_fields() {
        let event = ProductEvent {
            product_id: "P1".to_string(),
            event_id: "evt-1".to_string(),
            event_type: ProductEventType::Create,
            version: 3,
            updated_at: "2025-12-11T00:00:00Z".to_string(),
            data: serde_json::json!({"title": "Widget"}),
        };

        let doc = event.index_document();
        assert_eq!(doc["title"], "Widget");
        assert_eq!(doc["product_id"], "P1");
        assert_eq!(doc["version"], 3);
        assert_eq!(doc["updated_at"], "2025-12-11T00:00:00Z");
    }
}
