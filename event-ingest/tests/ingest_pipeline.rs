//! Integration tests for the ingestion pipeline.
//!
//! These tests exercise the real AppendLog, Batcher, replay, and HTTP
//! surface against a recording sink and a temporary log directory.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::mpsc;

use event_ingest::batcher::Batcher;
use event_ingest::log::AppendLog;
use event_ingest::models::Event;
use event_ingest::server::state::AppState;
use event_ingest::server::{create_app, replay_pending};
use event_ingest::sink::BatchSink;

/// Sink that records every batch it is handed and can be told to fail.
struct RecordingSink {
    batches: Mutex<Vec<Vec<Event>>>,
    fail: AtomicBool,
}

impl RecordingSink {
    fn new() -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    fn batch(&self, index: usize) -> Vec<Event> {
        self.batches.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl BatchSink for RecordingSink {
    async fn send(&self, events: &[Event]) -> bool {
        if self.fail.load(Ordering::SeqCst) {
            return false;
        }
        self.batches.lock().unwrap().push(events.to_vec());
        true
    }
}

fn test_event(i: usize) -> Event {
    Event {
        id: format!("evt-{}", i),
        event_type: "test".to_string(),
        data: json!({"value": i}),
        timestamp: 1234567890 + i as i64,
    }
}

#[tokio::test]
async fn test_size_based_flush() {
    let dir = TempDir::new().unwrap();
    let log = Arc::new(AppendLog::new(dir.path()).unwrap());
    let sink = Arc::new(RecordingSink::new());

    // Large timeout so only the size threshold can trigger the flush.
    let mut batcher = Batcher::new(log.clone(), sink.clone(), 5, Duration::from_secs(10));
    batcher.start();

    let handle = batcher.handle();
    for i in 0..5 {
        handle.add_event(test_event(i));
    }

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(sink.batch_count(), 1);
    let batch = sink.batch(0);
    assert_eq!(batch.len(), 5);
    // Submission order is preserved within the batch.
    let ids: Vec<&str> = batch.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["evt-0", "evt-1", "evt-2", "evt-3", "evt-4"]);
    // Delivered batches leave no file behind.
    assert!(log.list_pending().unwrap().is_empty());

    batcher.stop().await;
}

#[tokio::test]
async fn test_time_based_flush() {
    let dir = TempDir::new().unwrap();
    let log = Arc::new(AppendLog::new(dir.path()).unwrap());
    let sink = Arc::new(RecordingSink::new());

    // Size threshold far out of reach; the timer must flush.
    let mut batcher = Batcher::new(log.clone(), sink.clone(), 1000, Duration::from_millis(200));
    batcher.start();

    let handle = batcher.handle();
    for i in 0..3 {
        handle.add_event(test_event(i));
    }

    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(sink.batch_count(), 1);
    assert_eq!(sink.batch(0).len(), 3);
    assert!(log.list_pending().unwrap().is_empty());

    batcher.stop().await;
}

#[tokio::test]
async fn test_failed_delivery_leaves_file_for_replay() {
    let dir = TempDir::new().unwrap();
    let log = Arc::new(AppendLog::new(dir.path()).unwrap());
    let sink = Arc::new(RecordingSink::new());
    sink.fail.store(true, Ordering::SeqCst);

    let mut batcher = Batcher::new(log.clone(), sink.clone(), 2, Duration::from_millis(100));
    batcher.start();

    let handle = batcher.handle();
    handle.add_event(test_event(0));
    handle.add_event(test_event(1));

    tokio::time::sleep(Duration::from_millis(300)).await;
    batcher.stop().await;

    // The batch is durable on disk until delivery is acknowledged.
    let pending = log.list_pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(log.read_batch(&pending[0]).unwrap().len(), 2);
}

#[tokio::test]
async fn test_stop_flushes_remaining_events() {
    let dir = TempDir::new().unwrap();
    let log = Arc::new(AppendLog::new(dir.path()).unwrap());
    let sink = Arc::new(RecordingSink::new());

    let mut batcher = Batcher::new(log.clone(), sink.clone(), 100, Duration::from_secs(10));
    batcher.start();

    let handle = batcher.handle();
    handle.add_event(test_event(0));
    handle.add_event(test_event(1));

    batcher.stop().await;

    assert_eq!(sink.batch_count(), 1);
    assert_eq!(sink.batch(0).len(), 2);
    assert!(log.list_pending().unwrap().is_empty());
}

#[tokio::test]
async fn test_crash_replay_delivers_pending_batches_in_order() {
    let dir = TempDir::new().unwrap();

    // "Crashed" run: three batches written but never delivered.
    {
        let log = AppendLog::new(dir.path()).unwrap();
        for batch_index in 0..3 {
            let events = vec![
                test_event(batch_index * 2),
                test_event(batch_index * 2 + 1),
            ];
            log.write_batch(&events).unwrap();
        }
    }

    // Restarted run: a fresh log over the same directory replays them.
    let log = AppendLog::new(dir.path()).unwrap();
    assert_eq!(log.list_pending().unwrap().len(), 3);

    let sink = RecordingSink::new();
    let (delivered, remaining) = replay_pending(&log, &sink).await;

    assert_eq!(delivered, 3);
    assert_eq!(remaining, 0);
    assert_eq!(sink.batch_count(), 3);
    // Chronological order: first written batch replayed first.
    assert_eq!(sink.batch(0)[0].id, "evt-0");
    assert_eq!(sink.batch(1)[0].id, "evt-2");
    assert_eq!(sink.batch(2)[0].id, "evt-4");
    assert!(log.list_pending().unwrap().is_empty());
}

#[tokio::test]
async fn test_replay_continues_past_failing_files() {
    let dir = TempDir::new().unwrap();
    let log = AppendLog::new(dir.path()).unwrap();

    // An unreadable file sorted first, then a good batch.
    std::fs::write(dir.path().join("batch_00000000_000000_000000.jsonl"), "garbage\n").unwrap();
    log.write_batch(&[test_event(1)]).unwrap();

    let sink = RecordingSink::new();
    let (delivered, remaining) = replay_pending(&log, &sink).await;

    assert_eq!(delivered, 1);
    assert_eq!(remaining, 1);
    assert_eq!(sink.batch_count(), 1);
    // The corrupt file stays for the next cycle.
    assert_eq!(log.list_pending().unwrap().len(), 1);
}

#[tokio::test]
async fn test_replay_with_refusing_sink_keeps_all_files() {
    let dir = TempDir::new().unwrap();
    let log = AppendLog::new(dir.path()).unwrap();
    log.write_batch(&[test_event(0)]).unwrap();
    log.write_batch(&[test_event(1)]).unwrap();

    let sink = RecordingSink::new();
    sink.fail.store(true, Ordering::SeqCst);

    let (delivered, remaining) = replay_pending(&log, &sink).await;

    assert_eq!(delivered, 0);
    assert_eq!(remaining, 2);
    assert_eq!(log.list_pending().unwrap().len(), 2);
}

/// Spawn the app on an ephemeral port and return its base URL. The queue
/// receiver is returned so tests control whether the queue drains.
async fn spawn_app(queue_size: usize) -> (String, mpsc::Receiver<Event>) {
    let (queue_tx, queue_rx) = mpsc::channel::<Event>(queue_size);
    let app = create_app(AppState { queue_tx });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), queue_rx)
}

#[tokio::test]
async fn test_http_accept_and_backpressure() {
    let (base, _queue_rx) = spawn_app(2).await;
    let client = reqwest::Client::new();

    // Nothing drains the queue, so the third event must be rejected.
    let mut statuses = Vec::new();
    for i in 0..3 {
        let response = client
            .post(format!("{}/events", base))
            .body(format!(r#"{{"id":"evt-{}","type":"click","data":{{}}}}"#, i))
            .send()
            .await
            .unwrap();
        statuses.push(response.status().as_u16());
    }

    assert_eq!(statuses, [202, 202, 429]);
}

#[tokio::test]
async fn test_http_rejects_invalid_json() {
    let (base, _queue_rx) = spawn_app(10).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/events", base))
        .body("this is not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid JSON");
}

#[tokio::test]
async fn test_http_assigns_server_timestamp() {
    let (base, mut queue_rx) = spawn_app(10).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/events", base))
        .body(r#"{"id":"evt-1","type":"click","data":{"page":"/home"}}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 202);

    let event = queue_rx.recv().await.unwrap();
    assert_eq!(event.id, "evt-1");
    assert!(event.timestamp > 0);
}

#[tokio::test]
async fn test_http_health() {
    let (base, _queue_rx) = spawn_app(1).await;

    let response = reqwest::get(format!("{}/health", base)).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "ingest-demo");
}
