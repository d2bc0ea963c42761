//! Command-line arguments for `rag-query`.
//!
//! Flags override the environment-driven [`ContextorConfig`].

use clap::{Parser, ValueEnum};
use contextor::{ContextorConfig, IndexBackend};

/// Answer a question from a pre-built vector index and a local LLM
#[derive(Parser, Debug)]
#[command(name = "rag-query")]
#[command(version)]
#[command(about = "Answer a question using retrieved context from a vector index", long_about = None)]
pub struct Args {
    /// Question to ask
    #[arg(value_name = "QUERY_TEXT")]
    pub query: String,

    /// Local index directory/file, or Qdrant collection name (overrides RAG_INDEX_PATH)
    #[arg(long, value_name = "PATH")]
    pub index: Option<String>,

    /// Index backend (overrides RAG_INDEX_BACKEND)
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Completion model (overrides OLLAMA_MODEL)
    #[arg(long, value_name = "NAME")]
    pub model: Option<String>,

    /// Number of neighbors to retrieve (overrides RAG_TOP_K)
    #[arg(short = 'k', long = "top-k", value_name = "N")]
    pub top_k: Option<usize>,

    /// Print the structured answer as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,

    /// Verbosity: -v (debug), -vv (trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Local,
    Qdrant,
}

impl From<BackendArg> for IndexBackend {
    fn from(b: BackendArg) -> Self {
        match b {
            BackendArg::Local => IndexBackend::Local,
            BackendArg::Qdrant => IndexBackend::Qdrant,
        }
    }
}

impl Args {
    /// Applies flag overrides on top of `cfg`.
    pub fn apply(&self, cfg: &mut ContextorConfig) {
        if let Some(index) = &self.index {
            cfg.index_path = index.clone();
        }
        if let Some(backend) = self.backend {
            cfg.backend = backend.into();
        }
        if let Some(model) = &self.model {
            cfg.generation.model = model.clone();
        }
        if let Some(k) = self.top_k {
            cfg.top_k = k;
        }
    }

    /// Spinner only makes sense for interactive, human-readable runs.
    pub fn show_progress(&self) -> bool {
        !self.no_progress && !self.json
    }
}
