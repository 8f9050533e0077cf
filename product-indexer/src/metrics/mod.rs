//! Narrow counter interface for the consumer pipeline.
//!
//! Components take a `&dyn Counters` rather than touching shared counters
//! directly, so tests can count with a double and production can log.

use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

/// Interval at which [`LogCounters`] reports a counter's value.
const LOG_EVERY: u64 = 100;

/// Something that counts pipeline outcomes.
pub trait Counters: Send + Sync {
    /// Increment `metric` by one.
    fn incr(&self, metric: &'static str);
}

/// Counter implementation that logs every 100th increment of each metric.
pub struct LogCounters {
    counts: Mutex<HashMap<&'static str, u64>>,
}

impl LogCounters {
    pub fn new() -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for LogCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl Counters for LogCounters {
    fn incr(&self, metric: &'static str) {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(metric).or_insert(0);
        *count += 1;

        if *count % LOG_EVERY == 0 {
            info!(metric = metric, count = *count, "Counter checkpoint");
        }
    }
}
