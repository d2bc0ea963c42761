//! Typed error for the contextor crate.
//!
//! Each variant is one failure kind of the query pipeline. The originating
//! error is kept as `source` so callers can print the full chain.

use ai_llm_service::AiLlmError;
use rag_store::RagError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// The query text was rejected before any backend was touched.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The embedding backend failed or returned an unusable vector.
    #[error("embedding unavailable")]
    EmbeddingUnavailable(#[source] RagError),

    /// No index exists at the configured location.
    #[error("index not found at {0}")]
    IndexNotFound(String),

    /// Index I/O, parse or transport failure other than not-found.
    #[error("retrieval failed")]
    Retrieval(#[source] RagError),

    /// The completion backend was unreachable, timed out or answered garbage.
    #[error("model invocation failed")]
    ModelInvocationFailed(#[source] AiLlmError),

    /// The caller cancelled the query while it was in flight.
    #[error("query cancelled")]
    Cancelled,

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl ContextorError {
    /// Maps an index-side failure onto the pipeline kinds.
    pub(crate) fn from_index(err: RagError) -> Self {
        match err {
            RagError::IndexNotFound(location) => ContextorError::IndexNotFound(location),
            RagError::Config(msg) => ContextorError::Config(msg),
            other => ContextorError::Retrieval(other),
        }
    }
}
