//! # Event Ingest
//!
//! HTTP ingestion service with durable batching.
//!
//! ## Architecture
//!
//! Events accepted over HTTP flow through a bounded queue into a batcher
//! that owns the write-then-send-then-delete sequence:
//!
//! 1. **Accept**: `POST /events` pushes onto a bounded queue; a full queue
//!    answers 429 (the sole backpressure signal)
//! 2. **Batch**: the batcher flushes on size or time
//! 3. **Persist**: every batch is written to the append log *before*
//!    delivery is attempted
//! 4. **Deliver**: the batch file is deleted only after the sink
//!    acknowledges; failed batches stay on disk and are replayed at the
//!    next startup
//!
//! ## Modules
//!
//! - [`config`]: Configuration from environment variables
//! - [`models`]: Event types
//! - [`log`]: Append-only batch log (the durability primitive)
//! - [`sink`]: Downstream delivery adapters
//! - [`batcher`]: Size-or-time batching worker
//! - [`server`]: HTTP surface, startup replay, shutdown drain
//! - [`errors`]: Error types for the service

pub mod batcher;
pub mod config;
pub mod errors;
pub mod log;
pub mod models;
pub mod server;
pub mod sink;

pub use config::IngestConfig;
pub use errors::IngestError;
