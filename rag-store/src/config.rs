//! Index location and search configuration.

use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::RagError;

/// Distance function the index was built with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DistanceKind {
    /// Cosine similarity (recommended for most embeddings).
    #[default]
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

impl FromStr for DistanceKind {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(DistanceKind::Cosine),
            "dot" => Ok(DistanceKind::Dot),
            "euclid" | "euclidean" | "l2" => Ok(DistanceKind::Euclid),
            other => Err(RagError::Config(format!("unknown distance `{other}`"))),
        }
    }
}

/// Where the pre-built index lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexLocation {
    /// Directory containing `index.jsonl`, or a path to a `.jsonl` file.
    Local(PathBuf),
    /// A collection on a Qdrant server.
    Qdrant {
        /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
        url: String,
        /// Optional API key for Qdrant Cloud.
        api_key: Option<String>,
        /// Collection holding the vectors.
        collection: String,
    },
}

/// Configuration for opening and querying an index.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Index location.
    pub location: IndexLocation,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
    /// Exact search flag for Qdrant (false = HNSW ANN). Local search is always exact.
    pub exact_search: bool,
}

impl RagConfig {
    /// Local index at `path` with cosine similarity.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            location: IndexLocation::Local(path.into()),
            distance: DistanceKind::Cosine,
            exact_search: true,
        }
    }

    /// Qdrant collection with cosine similarity and ANN search.
    pub fn qdrant(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            location: IndexLocation::Qdrant {
                url: url.into(),
                api_key: None,
                collection: collection.into(),
            },
            distance: DistanceKind::Cosine,
            exact_search: false,
        }
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        match &self.location {
            IndexLocation::Local(path) => {
                if path.as_os_str().is_empty() {
                    return Err(RagError::Config("index path is empty".into()));
                }
            }
            IndexLocation::Qdrant {
                url, collection, ..
            } => {
                if url.trim().is_empty() {
                    return Err(RagError::Config("qdrant_url is empty".into()));
                }
                if collection.trim().is_empty() {
                    return Err(RagError::Config("collection is empty".into()));
                }
            }
        }
        Ok(())
    }
}
