//! Retrieval-augmented question answering.
//!
//! Public entry point: [`Contextor::ask`]. It embeds the question, retrieves
//! the top-K chunks from a `rag-store` index, composes a prompt (contextual or
//! plain), calls the completion model and returns the answer together with
//! the source id of every retrieved chunk.
//!
//! The embedder, index and model sit behind narrow traits and are shared via
//! `Arc`, so one `Contextor` can serve concurrent queries.

pub mod cfg;
mod error;
pub mod llm;
mod progress;
pub mod prompt;
pub mod stage;

mod api_types;

pub use api_types::{FormattedAnswer, ModelResponse};
pub use cfg::{ContextorConfig, IndexBackend};
pub use error::ContextorError;
pub use llm::{CompletionBackend, ModelInvoker};
pub use progress::{IndicatifProgress, NoopProgress, Progress};
pub use tokio_util::sync::CancellationToken;

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use rag_store::{EmbeddingsProvider, OllamaEmbedder, RetrievedChunk, VectorIndex};
use tracing::{debug, info, instrument};

use stage::StageTracker;

/// Query orchestrator wiring embedder → index → prompt → model.
///
/// # Example
/// ```no_run
/// # use contextor::{CancellationToken, Contextor, ContextorConfig};
/// # #[tokio::main] async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let cfg = ContextorConfig::from_env()?;
/// let ctx = Contextor::from_config(&cfg).await?;
/// let answer = ctx.ask("What is 2+2?", &CancellationToken::new()).await?;
/// println!("{answer}");
/// # Ok(()) }
/// ```
#[derive(Clone)]
pub struct Contextor {
    embedder: Arc<dyn EmbeddingsProvider>,
    index: Arc<dyn VectorIndex>,
    invoker: ModelInvoker,
    top_k: usize,
    progress: Arc<dyn Progress>,
}

impl Contextor {
    /// Wires already-built components.
    ///
    /// # Errors
    /// [`ContextorError::Config`] when `top_k` is zero.
    pub fn new(
        embedder: Arc<dyn EmbeddingsProvider>,
        index: Arc<dyn VectorIndex>,
        model: Arc<dyn CompletionBackend>,
        top_k: usize,
    ) -> Result<Self, ContextorError> {
        if top_k == 0 {
            return Err(ContextorError::Config("top_k must be > 0".into()));
        }
        Ok(Self {
            embedder,
            index,
            invoker: ModelInvoker::new(model),
            top_k,
            progress: Arc::new(NoopProgress),
        })
    }

    /// Builds the Ollama clients and opens the configured index.
    ///
    /// # Errors
    /// - [`ContextorError::Config`] for invalid settings.
    /// - [`ContextorError::IndexNotFound`] if the index location is empty.
    /// - [`ContextorError::Retrieval`] if the index cannot be loaded.
    pub async fn from_config(cfg: &ContextorConfig) -> Result<Self, ContextorError> {
        cfg.validate()?;

        let svc = Arc::new(
            LlmServiceProfiles::new(cfg.generation.clone(), cfg.embedding.clone())
                .map_err(|e| ContextorError::Config(e.to_string()))?,
        );
        let embedder = Arc::new(OllamaEmbedder::new(Arc::clone(&svc), cfg.embedding_dim));

        let index = rag_store::open_index(&cfg.make_rag_config())
            .await
            .map_err(ContextorError::from_index)?;

        check_embedding_dim(cfg.embedding_dim, index.as_ref())?;

        info!(
            index = %index.describe(),
            model = %cfg.generation.model,
            embedding_model = %embedder.model(),
            top_k = cfg.top_k,
            "contextor ready"
        );

        Self::new(embedder, index, svc, cfg.top_k)
    }

    /// Replaces the progress reporter (no-op by default).
    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Embeds `query` and returns the nearest chunks in rank order.
    ///
    /// # Errors
    /// - [`ContextorError::EmbeddingUnavailable`] if the embedder fails.
    /// - [`ContextorError::IndexNotFound`] / [`ContextorError::Retrieval`] on index failures.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>, ContextorError> {
        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(ContextorError::EmbeddingUnavailable)?;
        self.search(&vector).await
    }

    async fn search(&self, vector: &[f32]) -> Result<Vec<RetrievedChunk>, ContextorError> {
        let hits = self
            .index
            .search(vector, self.top_k)
            .await
            .map_err(ContextorError::from_index)?;
        debug!(k = self.top_k, hits = hits.len(), "retrieved");
        Ok(hits)
    }

    /// Answers `query` using retrieved context.
    ///
    /// Zero retrieved chunks is not an error: the question is asked without
    /// context and the answer carries no sources.
    ///
    /// # Errors
    /// - [`ContextorError::InvalidInput`] for a blank query.
    /// - [`ContextorError::Cancelled`] if `cancel` fires first.
    /// - Any embedding, retrieval or model failure, unchanged.
    #[instrument(skip_all, fields(query_len = query.len()))]
    pub async fn ask(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<FormattedAnswer, ContextorError> {
        let mut stage = StageTracker::new();
        let res = self.run(query, cancel, &mut stage).await;
        match &res {
            Ok(_) => self.progress.finish("done"),
            Err(e) => {
                stage.fail(e);
                self.progress.fail(&e.to_string());
            }
        }
        res
    }

    async fn run(
        &self,
        query: &str,
        cancel: &CancellationToken,
        stage: &mut StageTracker,
    ) -> Result<FormattedAnswer, ContextorError> {
        if query.trim().is_empty() {
            return Err(ContextorError::InvalidInput("query text is blank".into()));
        }
        ensure_live(cancel)?;

        self.progress.step("embedding query");
        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(ContextorError::EmbeddingUnavailable)?;
        stage.advance();
        ensure_live(cancel)?;

        self.progress.step("searching index");
        let chunks = self.search(&vector).await?;
        stage.advance();
        ensure_live(cancel)?;

        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let prompt = prompt::compose(&contents, query);
        info!("prompt:\n{prompt}");
        stage.advance();

        self.progress
            .step(&format!("waiting for {}", self.invoker.model()));
        let response = self.invoker.generate(&prompt, cancel).await?;
        stage.advance();

        let answer = FormattedAnswer::new(response, prompt, chunks);
        stage.advance();
        Ok(answer)
    }
}

/// Startup check: a configured `EMBEDDING_DIM` must agree with the index.
fn check_embedding_dim(
    want: Option<usize>,
    index: &dyn VectorIndex,
) -> Result<(), ContextorError> {
    match (want, index.dimension()) {
        (Some(want), Some(got)) if want != got => Err(ContextorError::Config(format!(
            "EMBEDDING_DIM={want} but index {} stores {got}-dimensional vectors",
            index.describe()
        ))),
        _ => Ok(()),
    }
}

fn ensure_live(cancel: &CancellationToken) -> Result<(), ContextorError> {
    if cancel.is_cancelled() {
        return Err(ContextorError::Cancelled);
    }
    Ok(())
}
