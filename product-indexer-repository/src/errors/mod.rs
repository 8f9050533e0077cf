//! Store error types.
//!
//! This module defines the unified error type for index and cache store
//! operations. Store implementations convert backend-specific errors into
//! these variants at their boundary; callers never see transport types.

use thiserror::Error;

/// Unified errors from store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Failed to establish a connection to the backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A request to the backend failed or returned a non-success status.
    #[error("Request error: {0}")]
    RequestError(String),

    /// Failed to parse a response from the backend.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl StoreError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}
