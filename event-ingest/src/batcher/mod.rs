//! Size-or-time batching worker.
//!
//! The batcher owns the durable write-then-send-then-delete sequence: a
//! batch is persisted to the append log before the sink sees it, and the
//! file is deleted only on acknowledged delivery.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::log::AppendLog;
use crate::models::Event;
use crate::sink::BatchSink;

/// Handle for feeding events into a running batcher.
///
/// Cloneable; the queue consumer holds one while the batcher itself is
/// owned by the server lifecycle.
#[derive(Clone)]
pub struct BatcherHandle {
    inner: Arc<BatcherInner>,
}

impl BatcherHandle {
    /// Append an event to the current in-memory batch, waking the worker
    /// immediately when the high-water mark is reached.
    pub fn add_event(&self, event: Event) {
        let at_high_water = {
            let mut current = self.inner.current.lock().unwrap();
            current.push(event);
            current.len() >= self.inner.max_batch_size
        };

        if at_high_water {
            self.inner.wakeup.notify_one();
        }
    }
}

/// Background batcher with one worker task.
pub struct Batcher {
    inner: Arc<BatcherInner>,
    worker: Option<JoinHandle<()>>,
}

struct BatcherInner {
    log: Arc<AppendLog>,
    sink: Arc<dyn BatchSink>,
    max_batch_size: usize,
    max_wait: Duration,
    current: Mutex<Vec<Event>>,
    wakeup: Notify,
    running: AtomicBool,
}

impl Batcher {
    pub fn new(
        log: Arc<AppendLog>,
        sink: Arc<dyn BatchSink>,
        max_batch_size: usize,
        max_wait: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(BatcherInner {
                log,
                sink,
                max_batch_size,
                max_wait,
                current: Mutex::new(Vec::new()),
                wakeup: Notify::new(),
                running: AtomicBool::new(false),
            }),
            worker: None,
        }
    }

    /// A handle for producers to feed events through.
    pub fn handle(&self) -> BatcherHandle {
        BatcherHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Spawn the worker task.
    pub fn start(&mut self) {
        self.inner.running.store(true, Ordering::SeqCst);

        let inner = Arc::clone(&self.inner);
        self.worker = Some(tokio::spawn(async move {
            inner.worker_loop().await;
        }));

        info!(
            max_batch_size = self.inner.max_batch_size,
            max_wait_ms = self.inner.max_wait.as_millis() as u64,
            "Batcher started"
        );
    }

    /// Stop the worker and drain any remaining in-memory events through
    /// one final write-send-delete cycle.
    pub async fn stop(&mut self) {
        self.inner.running.store(false, Ordering::SeqCst);
        self.inner.wakeup.notify_one();

        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }

        self.inner.flush_once().await;
        info!("Batcher stopped");
    }
}

impl BatcherInner {
    /// Wait for the high-water mark or the flush timeout, whichever comes
    /// first, then flush whatever accumulated.
    async fn worker_loop(&self) {
        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                _ = self.wakeup.notified() => {}
                _ = tokio::time::sleep(self.max_wait) => {}
            }

            self.flush_once().await;
        }
    }

    /// One write-then-send-then-delete cycle.
    ///
    /// After the write returns, the events are durable until explicitly
    /// deleted; a refused delivery leaves the file for replay. A failed
    /// write drops the batch from memory.
    async fn flush_once(&self) {
        let batch = {
            let mut current = self.current.lock().unwrap();
            if current.is_empty() {
                return;
            }
            std::mem::take(&mut *current)
        };

        let filename = match self.log.write_batch(&batch) {
            Ok(filename) => filename,
            Err(e) => {
                error!(
                    error = %e,
                    dropped_events = batch.len(),
                    "Failed to persist batch; events dropped"
                );
                return;
            }
        };

        if self.sink.send(&batch).await {
            if let Err(e) = self.log.delete_batch(&filename) {
                warn!(file = %filename, error = %e, "Failed to delete delivered batch");
            }
        } else {
            warn!(
                file = %filename,
                events = batch.len(),
                "Batch failed to send, keeping log file for replay"
            );
        }
    }
}
