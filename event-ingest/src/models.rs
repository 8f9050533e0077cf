//! Event types for the ingestion service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An event as staged on disk and delivered to the sink.
///
/// Immutable after creation. `timestamp` (milliseconds since epoch) is
/// assigned by the server on receipt, never by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Opaque client-supplied identifier.
    pub id: String,
    /// Event type label.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Arbitrary JSON payload.
    #[serde(default)]
    pub data: Value,
    /// Milliseconds since epoch, assigned on receipt.
    pub timestamp: i64,
}

/// The request body of `POST /events`; the server adds the timestamp.
#[derive(Debug, Deserialize)]
pub struct IncomingEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

impl IncomingEvent {
    /// Stamp the event with its receipt time.
    pub fn into_event(self, timestamp: i64) -> Event {
        Event {
            id: self.id,
            event_type: self.event_type,
            data: self.data,
            timestamp,
        }
    }
}
