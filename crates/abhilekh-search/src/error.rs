//! Error types for abhilekh-search

use thiserror::Error;

/// Errors that can occur on the search path
#[derive(Error, Debug)]
pub enum SearchError {
    /// Request rejected before any collaborator call
    #[error("{0}")]
    Validation(String),

    /// Query classification failed or returned an unusable structure
    #[error("query analysis failed: {0}")]
    QueryAnalysis(String),

    /// Embedding call failed
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Embedding has the wrong dimensionality. Hard failure, never
    /// truncated or padded
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    EmbeddingDimension { expected: usize, actual: usize },

    /// Document store fault, propagated without local retry
    #[error("search backend error: {0}")]
    Backend(#[from] abhilekh_store::StoreError),
}

impl SearchError {
    /// True for errors that map to a client-facing 400.
    pub fn is_validation(&self) -> bool {
        matches!(self, SearchError::Validation(_))
    }
}

/// Result type for abhilekh-search operations
pub type Result<T> = std::result::Result<T, SearchError>;
