//! Ollama embedding provider.
//!
//! Delegates to the `embedding` profile of a shared [`LlmServiceProfiles`].

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::{EmbeddingsProvider, RagError};

/// Ollama embedding provider (async).
#[derive(Clone)]
pub struct OllamaEmbedder {
    svc: Arc<LlmServiceProfiles>,
    /// Expected embedding size; `None` accepts whatever the model returns.
    dim: Option<usize>,
}

impl OllamaEmbedder {
    pub fn new(svc: Arc<LlmServiceProfiles>, dim: Option<usize>) -> Self {
        Self { svc, dim }
    }

    /// Name of the embedding model in use.
    pub fn model(&self) -> &str {
        &self.svc.profiles().1.model
    }
}

impl EmbeddingsProvider for OllamaEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
        Box::pin(async move {
            let vector = self
                .svc
                .embed(text)
                .await
                .map_err(|e| RagError::Embedding(e.to_string()))?;
            let vector = expect_dim(vector, self.dim)?;

            debug!(dim = vector.len(), "query embedded");
            Ok(vector)
        })
    }

    fn dimension(&self) -> Option<usize> {
        self.dim
    }
}

/// Passes `vector` through unless its size disagrees with `want`.
fn expect_dim(vector: Vec<f32>, want: Option<usize>) -> Result<Vec<f32>, RagError> {
    match want {
        Some(want) if vector.len() != want => {
            warn!(got = vector.len(), want, "embedding size differs from EMBEDDING_DIM");
            Err(RagError::VectorSizeMismatch {
                got: vector.len(),
                want,
            })
        }
        _ => Ok(vector),
    }
}
