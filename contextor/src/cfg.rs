//! Runtime configuration loaded from environment variables.
//!
//! Everything is resolved through a `lookup` function so tests can feed a
//! plain map instead of touching the process environment.

use std::str::FromStr;

use ai_llm_service::LlmModelConfig;
use ai_llm_service::config::default_config::{config_embedding, config_generation};
use rag_store::{DistanceKind, IndexLocation, RagConfig};

use crate::error::ContextorError;

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_INDEX_PATH: &str = "index";
pub const DEFAULT_QDRANT_URL: &str = "http://127.0.0.1:6334";

/// Which index backend to open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IndexBackend {
    #[default]
    Local,
    Qdrant,
}

impl FromStr for IndexBackend {
    type Err = ContextorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(IndexBackend::Local),
            "qdrant" => Ok(IndexBackend::Qdrant),
            other => Err(ContextorError::Config(format!(
                "RAG_INDEX_BACKEND: unknown backend `{other}` (expected local|qdrant)"
            ))),
        }
    }
}

/// Config bag for one process. All fields have defaults via [`ContextorConfig::from_env`].
#[derive(Clone, Debug)]
pub struct ContextorConfig {
    pub backend: IndexBackend,
    /// Local index dir/file, or the Qdrant collection name.
    pub index_path: String,
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    pub distance: DistanceKind,
    pub top_k: usize,
    /// Expected embedding size; checked on every query vector when set.
    pub embedding_dim: Option<usize>,

    pub generation: LlmModelConfig,
    pub embedding: LlmModelConfig,
}

impl ContextorConfig {
    /// Build from the process environment.
    ///
    /// # Errors
    /// Returns [`ContextorError::Config`] for values that do not parse.
    pub fn from_env() -> Result<Self, ContextorError> {
        Self::from_lookup(&|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary variable source.
    ///
    /// Only parses; range checks are left to [`ContextorConfig::validate`] so
    /// callers can apply overrides first.
    ///
    /// # Errors
    /// Returns [`ContextorError::Config`] for values that do not parse.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ContextorError> {
        let generation = config_generation(lookup).map_err(config_err)?;
        let embedding = config_embedding(lookup).map_err(config_err)?;

        Ok(Self {
            backend: match var(lookup, "RAG_INDEX_BACKEND") {
                Some(v) => v.parse()?,
                None => IndexBackend::default(),
            },
            index_path: env(lookup, "RAG_INDEX_PATH", DEFAULT_INDEX_PATH),
            qdrant_url: env(lookup, "QDRANT_URL", DEFAULT_QDRANT_URL),
            qdrant_api_key: var(lookup, "QDRANT_API_KEY"),
            distance: match var(lookup, "RAG_DISTANCE") {
                Some(v) => v
                    .parse()
                    .map_err(|e: rag_store::RagError| ContextorError::Config(e.to_string()))?,
                None => DistanceKind::default(),
            },
            top_k: parse(lookup, "RAG_TOP_K", DEFAULT_TOP_K)?,
            embedding_dim: match var(lookup, "EMBEDDING_DIM") {
                Some(_) => Some(parse(lookup, "EMBEDDING_DIM", 0usize)?),
                None => None,
            },
            generation,
            embedding,
        })
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    /// Returns [`ContextorError::Config`] on the first violated constraint.
    pub fn validate(&self) -> Result<(), ContextorError> {
        if self.top_k == 0 {
            return Err(ContextorError::Config("RAG_TOP_K must be > 0".into()));
        }
        if self.embedding_dim == Some(0) {
            return Err(ContextorError::Config("EMBEDDING_DIM must be > 0".into()));
        }
        if self.index_path.trim().is_empty() {
            return Err(ContextorError::Config("RAG_INDEX_PATH is empty".into()));
        }
        self.generation.validate().map_err(config_err)?;
        self.embedding.validate().map_err(config_err)?;
        Ok(())
    }

    /// Convert to a `rag_store::RagConfig` for [`rag_store::open_index`].
    pub fn make_rag_config(&self) -> RagConfig {
        let location = match self.backend {
            IndexBackend::Local => IndexLocation::Local(self.index_path.clone().into()),
            IndexBackend::Qdrant => IndexLocation::Qdrant {
                url: self.qdrant_url.clone(),
                api_key: self.qdrant_api_key.clone(),
                collection: self.index_path.clone(),
            },
        };
        RagConfig {
            location,
            distance: self.distance,
            exact_search: true,
        }
    }
}

fn config_err(e: impl std::fmt::Display) -> ContextorError {
    ContextorError::Config(e.to_string())
}

fn var(lookup: &dyn Fn(&str) -> Option<String>, k: &str) -> Option<String> {
    lookup(k)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env(lookup: &dyn Fn(&str) -> Option<String>, k: &str, dflt: &str) -> String {
    var(lookup, k).unwrap_or_else(|| dflt.to_string())
}

fn parse<T: FromStr>(
    lookup: &dyn Fn(&str) -> Option<String>,
    k: &str,
    dflt: T,
) -> Result<T, ContextorError> {
    match var(lookup, k) {
        Some(v) => v
            .parse()
            .map_err(|_| ContextorError::Config(format!("{k}: cannot parse `{v}`"))),
        None => Ok(dflt),
    }
}
