//! Read-only retrieval over a pre-built vector index.
//!
//! This crate provides:
//! - [`EmbeddingsProvider`]: text → vector, with an Ollama-backed implementation
//! - [`VectorIndex`]: kNN search over a local JSONL index or a Qdrant collection
//! - [`open_index`]: opens whichever backend a [`RagConfig`] points at
//!
//! Scores are similarities: higher means closer, for every distance kind.

mod config;
pub mod embed;
mod errors;
pub mod index;
mod io_jsonl;
mod record;

use std::sync::Arc;

pub use config::{DistanceKind, IndexLocation, RagConfig};
pub use embed::EmbeddingsProvider;
pub use embed::ollama::OllamaEmbedder;
pub use errors::RagError;
pub use index::VectorIndex;
pub use index::local::LocalIndex;
pub use index::qdrant::QdrantIndex;
pub use io_jsonl::read_index_rows;
pub use record::{IndexRecord, RetrievedChunk};

use tracing::debug;

/// Opens the index described by `cfg` as a shareable handle.
///
/// # Errors
/// - [`RagError::Config`] for an invalid configuration.
/// - [`RagError::IndexNotFound`] if nothing exists at the location.
/// - Backend-specific I/O, parse or client errors.
pub async fn open_index(cfg: &RagConfig) -> Result<Arc<dyn VectorIndex>, RagError> {
    cfg.validate()?;
    debug!("open_index location={:?} distance={:?}", cfg.location, cfg.distance);

    match &cfg.location {
        IndexLocation::Local(path) => Ok(Arc::new(LocalIndex::open(path, cfg.distance)?)),
        IndexLocation::Qdrant {
            url,
            api_key,
            collection,
        } => {
            let idx = QdrantIndex::open(
                url,
                api_key.as_deref(),
                collection,
                cfg.distance,
                cfg.exact_search,
            )
            .await?;
            Ok(Arc::new(idx))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_index_reports_missing_local_path() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = RagConfig::local(dir.path().join("missing"));
        match open_index(&cfg).await {
            Err(RagError::IndexNotFound(p)) => assert!(p.ends_with("missing")),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("expected IndexNotFound"),
        }
    }

    #[tokio::test]
    async fn open_index_serves_local_rows() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.jsonl"),
            "{\"text\":\"foo\",\"embedding\":[1.0,0.0],\"metadata\":{\"id\":\"doc1\"}}\n\
             {\"text\":\"bar\",\"embedding\":[0.0,1.0],\"metadata\":{\"id\":\"doc2\"}}\n",
        )
        .unwrap();

        let idx = open_index(&RagConfig::local(dir.path())).await.unwrap();
        let hits = idx.search(&[0.0, 1.0], 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].content, "bar");
        assert_eq!(hits[1].source_id().as_deref(), Some("doc1"));
    }
}
