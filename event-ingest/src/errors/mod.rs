//! Error types for the ingestion service.

use thiserror::Error;

/// Errors that can occur in the ingestion service.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Filesystem error in the append log.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A batch file contains a line that is not a valid event record.
    #[error("Corrupt batch {file} at line {line}: {reason}")]
    CorruptBatch {
        file: String,
        line: usize,
        reason: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP server error.
    #[error("Server error: {0}")]
    ServerError(String),
}

impl IngestError {
    /// Create an I/O error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::IoError(msg.into())
    }

    /// Create a corrupt-batch error.
    pub fn corrupt_batch(file: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        Self::CorruptBatch {
            file: file.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a server error.
    pub fn server(msg: impl Into<String>) -> Self {
        Self::ServerError(msg.into())
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}
