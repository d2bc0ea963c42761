//! Default model configs resolved from environment-style variables.
//!
//! Two roles are used by the query pipeline:
//!
//! - **Generation** → completion model that answers the question
//! - **Embedding**  → model used to vectorize the query (must match the index build)
//!
//! Every constructor takes a `lookup` function instead of reading the process
//! environment directly, so callers can pass `std::env::var` or a fixed map.
//!
//! # Variables
//!
//! - `LLM_KIND`          = provider kind (default `ollama`)
//! - `OLLAMA_URL`        = endpoint (default `http://localhost:11434`)
//! - `OLLAMA_PORT`       = used as `http://localhost:{port}` when `OLLAMA_URL` is unset
//! - `OLLAMA_MODEL`      = completion model (default `llama3`)
//! - `EMBEDDING_MODEL`   = embedding model (default `nomic-embed-text`)
//! - `LLM_MAX_TOKENS`    = optional `num_predict`
//! - `LLM_TIMEOUT_SECS`  = completion timeout (default 600)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{ConfigError, Result, opt_u32, opt_u64, opt_var},
};

/// Default Ollama endpoint when nothing is configured.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Default completion model.
pub const DEFAULT_GENERATION_MODEL: &str = "llama3";
/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 600;
const DEFAULT_EMBEDDING_TIMEOUT_SECS: u64 = 30;

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
/// 3. [`DEFAULT_OLLAMA_URL`]
///
/// # Errors
/// [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is not a valid port.
fn ollama_endpoint(lookup: &dyn Fn(&str) -> Option<String>) -> Result<String> {
    if let Some(url) = opt_var(lookup, "OLLAMA_URL") {
        return Ok(url.trim().to_string());
    }
    if let Some(port) = opt_var(lookup, "OLLAMA_PORT") {
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Ok(DEFAULT_OLLAMA_URL.to_string())
}

fn provider(lookup: &dyn Fn(&str) -> Option<String>) -> Result<LlmProvider> {
    match opt_var(lookup, "LLM_KIND") {
        Some(kind) => Ok(kind.parse::<LlmProvider>()?),
        None => Ok(LlmProvider::Ollama),
    }
}

/// Constructs the config for the **generation** model.
///
/// # Defaults
/// - `model = "llama3"`
/// - `temperature = None` (backend default)
/// - `timeout_secs = Some(600)`
pub fn config_generation(lookup: &dyn Fn(&str) -> Option<String>) -> Result<LlmModelConfig> {
    let cfg = LlmModelConfig {
        provider: provider(lookup)?,
        model: opt_var(lookup, "OLLAMA_MODEL")
            .unwrap_or_else(|| DEFAULT_GENERATION_MODEL.to_string()),
        endpoint: ollama_endpoint(lookup)?,
        max_tokens: opt_u32(lookup, "LLM_MAX_TOKENS")?,
        temperature: None,
        top_p: None,
        timeout_secs: Some(
            opt_u64(lookup, "LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECS),
        ),
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Constructs the config for the **embedding** model.
///
/// # Defaults
/// - `model = "nomic-embed-text"`
/// - `temperature = Some(0.0)` (deterministic)
/// - `timeout_secs = Some(30)`
pub fn config_embedding(lookup: &dyn Fn(&str) -> Option<String>) -> Result<LlmModelConfig> {
    let cfg = LlmModelConfig {
        provider: provider(lookup)?,
        model: opt_var(lookup, "EMBEDDING_MODEL")
            .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
        endpoint: ollama_endpoint(lookup)?,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(DEFAULT_EMBEDDING_TIMEOUT_SECS),
    };
    cfg.validate()?;
    Ok(cfg)
}
