//! Append-only batch log.
//!
//! The durability primitive of the ingestion service: every batch is
//! materialized here before delivery is attempted, and a file is removed
//! only after the sink acknowledges it. The set of files on disk is
//! therefore exactly the set of batches not yet confirmed delivered.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, info};

use crate::errors::IngestError;
use crate::models::Event;

/// Filesystem-backed ordered batch store.
///
/// Filenames are `batch_<YYYYMMDD>_<HHMMSS>_<counter>.jsonl` with a
/// zero-padded process-local counter, so lexicographic order equals
/// creation order within a process run. Writes go to a temporary name and
/// are renamed into place; any file visible to `list_pending` is fully
/// formed.
pub struct AppendLog {
    dir: PathBuf,
    /// Monotonic batch counter; the mutex also serializes writes and
    /// deletes.
    counter: Mutex<u64>,
}

impl AppendLog {
    /// Open (and create if needed) the log directory.
    ///
    /// An unwritable directory is a fatal startup error.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, IngestError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| IngestError::io(format!("create log dir {}: {}", dir.display(), e)))?;

        info!(dir = %dir.display(), "Append log initialized");

        Ok(Self {
            dir,
            counter: Mutex::new(0),
        })
    }

    /// Atomically materialize a batch as one JSONL file.
    ///
    /// Returns the filename (relative to the log directory).
    pub fn write_batch(&self, events: &[Event]) -> Result<String, IngestError> {
        let mut counter = self.counter.lock().unwrap();

        let filename = format!(
            "batch_{}_{:06}.jsonl",
            chrono::Utc::now().format("%Y%m%d_%H%M%S"),
            *counter
        );
        *counter += 1;

        let mut contents = String::new();
        for event in events {
            let line = serde_json::to_string(event)
                .map_err(|e| IngestError::io(format!("serialize event {}: {}", event.id, e)))?;
            contents.push_str(&line);
            contents.push('\n');
        }

        // Write to a temporary name and rename so a concurrent listing
        // never observes a half-written batch.
        let tmp_path = self.dir.join(format!(".{}.tmp", filename));
        let final_path = self.dir.join(&filename);

        let mut file = File::create(&tmp_path)
            .map_err(|e| IngestError::io(format!("create {}: {}", tmp_path.display(), e)))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| IngestError::io(format!("write {}: {}", tmp_path.display(), e)))?;
        file.sync_all()
            .map_err(|e| IngestError::io(format!("sync {}: {}", tmp_path.display(), e)))?;
        fs::rename(&tmp_path, &final_path)
            .map_err(|e| IngestError::io(format!("rename {}: {}", final_path.display(), e)))?;

        info!(file = %filename, events = events.len(), "Wrote batch");

        Ok(filename)
    }

    /// Remove a batch file. Idempotent; a missing file is not an error.
    pub fn delete_batch(&self, filename: &str) -> Result<(), IngestError> {
        let _guard = self.counter.lock().unwrap();

        match fs::remove_file(self.dir.join(filename)) {
            Ok(()) => {
                debug!(file = %filename, "Deleted batch file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(IngestError::io(format!("delete {}: {}", filename, e))),
        }
    }

    /// All pending batch filenames, lexicographically (= chronologically)
    /// sorted.
    pub fn list_pending(&self) -> Result<Vec<String>, IngestError> {
        let mut batches = Vec::new();

        for entry in fs::read_dir(&self.dir)
            .map_err(|e| IngestError::io(format!("read dir {}: {}", self.dir.display(), e)))?
        {
            let entry = entry.map_err(|e| IngestError::io(e.to_string()))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "jsonl") {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    batches.push(name.to_string());
                }
            }
        }

        batches.sort();
        Ok(batches)
    }

    /// Parse a batch file back into events.
    ///
    /// Any line that is not a valid event record fails the whole batch
    /// with `CorruptBatch`.
    pub fn read_batch(&self, filename: &str) -> Result<Vec<Event>, IngestError> {
        let path = self.dir.join(filename);
        let file = File::open(&path)
            .map_err(|e| IngestError::io(format!("open {}: {}", path.display(), e)))?;

        let mut events = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| IngestError::io(format!("read {}: {}", filename, e)))?;
            if line.is_empty() {
                continue;
            }

            let event: Event = serde_json::from_str(&line)
                .map_err(|e| IngestError::corrupt_batch(filename, index + 1, e.to_string()))?;
            events.push(event);
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_event(i: usize) -> Event {
        Event {
            id: format!("evt-{}", i),
            event_type: "test".to_string(),
            data: json!({"value": i}),
            timestamp: 1234567890 + i as i64,
        }
    }

    #[test]
    fn test_write_and_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let log = AppendLog::new(dir.path()).unwrap();

        let events: Vec<Event> = (0..5).map(test_event).collect();
        let filename = log.write_batch(&events).unwrap();
        assert!(filename.ends_with(".jsonl"));

        let read_back = log.read_batch(&filename).unwrap();
        assert_eq!(read_back, events);
    }

    #[test]
    fn test_delete_batch_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let log = AppendLog::new(dir.path()).unwrap();

        let filename = log.write_batch(&[test_event(1)]).unwrap();
        log.delete_batch(&filename).unwrap();
        // Second delete of a missing file is not an error.
        log.delete_batch(&filename).unwrap();

        assert!(log.list_pending().unwrap().is_empty());
    }

    #[test]
    fn test_list_pending_is_sorted_in_write_order() {
        let dir = TempDir::new().unwrap();
        let log = AppendLog::new(dir.path()).unwrap();

        let mut written = Vec::new();
        for i in 0..12 {
            written.push(log.write_batch(&[test_event(i)]).unwrap());
        }

        // Lexicographic listing equals write order, including across the
        // single-digit/double-digit counter boundary.
        assert_eq!(log.list_pending().unwrap(), written);
    }

    #[test]
    fn test_read_batch_rejects_corrupt_line() {
        let dir = TempDir::new().unwrap();
        let log = AppendLog::new(dir.path()).unwrap();

        let filename = "batch_20250101_000000_000000.jsonl";
        fs::write(
            dir.path().join(filename),
            "{\"id\":\"e1\",\"type\":\"t\",\"data\":{},\"timestamp\":1}\nnot json\n",
        )
        .unwrap();

        let err = log.read_batch(filename).unwrap_err();
        assert!(matches!(err, IngestError::CorruptBatch { line: 2, .. }));
    }

    #[test]
    fn test_read_batch_rejects_missing_fields() {
        let dir = TempDir::new().unwrap();
        let log = AppendLog::new(dir.path()).unwrap();

        let filename = "batch_20250101_000000_000000.jsonl";
        fs::write(dir.path().join(filename), "{\"id\":\"e1\"}\n").unwrap();

        assert!(log.read_batch(filename).is_err());
    }

    #[test]
    fn test_tmp_files_are_not_listed() {
        let dir = TempDir::new().unwrap();
        let log = AppendLog::new(dir.path()).unwrap();

        fs::write(dir.path().join(".batch_x.jsonl.tmp"), "partial").unwrap();
        log.write_batch(&[test_event(1)]).unwrap();

        assert_eq!(log.list_pending().unwrap().len(), 1);
    }
}
