//! Error types for abhilekh-store

use thiserror::Error;

/// Errors that can occur in document store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Connection error
    #[error("connection failed: {0}")]
    Connection(String),

    /// The store answered with a non-success status
    #[error("store request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be decoded
    #[error("invalid store response: {0}")]
    Decode(String),

    /// Document not found
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a Status error from a status code and response body.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}

/// Result type for abhilekh-store operations
pub type Result<T> = std::result::Result<T, StoreError>;
