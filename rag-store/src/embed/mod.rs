use crate::errors::RagError;
use futures::future::BoxFuture;

/// Provider interface for embedding generation.
///
/// Async because real providers (Ollama and friends) perform HTTP requests.
/// Implementations must be deterministic for a fixed backend configuration:
/// the same text always maps to the same vector.
pub trait EmbeddingsProvider: Send + Sync {
    /// Produces an embedding vector for the given text.
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>>;

    /// Expected vector size, when known up front.
    fn dimension(&self) -> Option<usize> {
        None
    }
}

pub mod ollama;
