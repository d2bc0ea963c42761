//! Shared LLM backend access for the query pipeline.
//!
//! - [`config`]: model configs and env-driven defaults for the generation and
//!   embedding roles.
//! - [`services::ollama_service`]: thin HTTP client for `/api/generate` and
//!   `/api/embeddings`.
//! - [`service_profiles`]: one object holding both roles, built once at startup
//!   and shared behind an `Arc`.
//! - [`telemetry`]: a compact `tracing` layer for the workspace crates.

pub mod config;
pub mod error_handler;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use error_handler::{AiLlmError, ConfigError};
pub use service_profiles::LlmServiceProfiles;
