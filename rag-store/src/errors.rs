//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// I/O or filesystem errors while reading an index.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed index rows or payloads.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// No index exists at the configured location.
    #[error("index not found at {0}")]
    IndexNotFound(String),

    /// Mismatch in vector dimensionality (index rows, query vector, or embedder).
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// The embedding backend could not produce a vector.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),
}
