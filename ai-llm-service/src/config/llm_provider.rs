use std::str::FromStr;

use crate::error_handler::ConfigError;

/// Represents the provider (backend) used for completions and embeddings.
///
/// Only a local or remote Ollama runtime is wired today. New backends are added
/// by extending this enum and the match in
/// [`LlmServiceProfiles`](crate::service_profiles::LlmServiceProfiles).
///
/// # Examples
///
/// ```
/// use ai_llm_service::LlmProvider;
///
/// let p: LlmProvider = "ollama".parse().unwrap();
/// assert_eq!(p, LlmProvider::Ollama);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Ollama runtime reachable over HTTP.
    Ollama,
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
