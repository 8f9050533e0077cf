// App state for the Axum server
use tokio::sync::mpsc;

use crate::models::Event;

#[derive(Clone)]
pub struct AppState {
    /// Bounded accept queue; `try_send` full = backpressure (429).
    pub queue_tx: mpsc::Sender<Event>,
}
