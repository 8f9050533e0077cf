// HTTP request handlers
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

use crate::models::IncomingEvent;
use crate::server::state::AppState;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({"status": "healthy", "service": "ingest-demo"})),
    )
}

/// Accept one event: parse, stamp the receipt time, push onto the bounded
/// queue. The fast path never blocks; a full queue is the backpressure
/// signal.
pub async fn post_event(
    State(state): State<AppState>,
    body: String,
) -> (StatusCode, Json<Value>) {
    let incoming: IncomingEvent = match serde_json::from_str(&body) {
        Ok(incoming) => incoming,
        Err(e) => {
            debug!(error = %e, "Rejected unparseable event body");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "invalid JSON"})),
            );
        }
    };

    let event = incoming.into_event(chrono::Utc::now().timestamp_millis());

    match state.queue_tx.try_send(event) {
        Ok(()) => (StatusCode::ACCEPTED, Json(json!({"status": "accepted"}))),
        Err(TrySendError::Full(_)) => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"error": "queue full"})),
        ),
        Err(TrySendError::Closed(_)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "shutting down"})),
        ),
    }
}
