//! Shared LLM service with two profiles: `generation` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Both HTTP clients are built eagerly, so a bad endpoint fails at startup
//!   rather than on the first query.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::LlmServiceProfiles;
//! use ai_llm_service::config::default_config::{config_embedding, config_generation};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let env = |k: &str| std::env::var(k).ok();
//! let svc = Arc::new(LlmServiceProfiles::new(
//!     config_generation(&env)?,
//!     config_embedding(&env)?,
//! )?);
//!
//! let txt = svc.generate("Hello world").await?;
//! let emb = svc.embed("Ferris").await?;
//! println!("{txt} / dim={}", emb.len());
//! # Ok(()) }
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    services::ollama_service::OllamaService,
};

/// Shared service that manages the **generation** and **embedding** profiles.
pub struct LlmServiceProfiles {
    generation: LlmModelConfig,
    embedding: LlmModelConfig,

    generation_client: Arc<OllamaService>,
    embedding_client: Arc<OllamaService>,
}

impl LlmServiceProfiles {
    /// Creates a new service from the two profiles.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if a profile is invalid or its client cannot be built.
    pub fn new(
        generation: LlmModelConfig,
        embedding: LlmModelConfig,
    ) -> Result<Self, AiLlmError> {
        generation.validate()?;
        embedding.validate()?;

        let generation_client = Arc::new(build_client(&generation)?);
        let embedding_client = if embedding == generation {
            Arc::clone(&generation_client)
        } else {
            Arc::new(build_client(&embedding)?)
        };

        debug!(
            generation = %generation.model,
            embedding = %embedding.model,
            "LlmServiceProfiles ready"
        );

        Ok(Self {
            generation,
            embedding,
            generation_client,
            embedding_client,
        })
    }

    /// Generates text using the **generation** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if generation fails.
    pub async fn generate(&self, prompt: &str) -> Result<String, AiLlmError> {
        match self.generation.provider {
            LlmProvider::Ollama => self
                .generation_client
                .generate(prompt)
                .await
                .map_err(AiLlmError::from),
        }
    }

    /// Computes embeddings using the **embedding** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if embedding fails.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match self.embedding.provider {
            LlmProvider::Ollama => self
                .embedding_client
                .embeddings(input)
                .await
                .map_err(AiLlmError::from),
        }
    }

    /// Returns references to the current profiles `(generation, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.generation, &self.embedding)
    }
}

fn build_client(cfg: &LlmModelConfig) -> Result<OllamaService, AiLlmError> {
    match cfg.provider {
        LlmProvider::Ollama => Ok(OllamaService::new(cfg.clone())?),
    }
}
