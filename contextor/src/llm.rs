//! Model invoker: times a completion call and honours cancellation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ai_llm_service::{AiLlmError, LlmServiceProfiles};
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api_types::ModelResponse;
use crate::error::ContextorError;

/// A completion backend: prompt in, text out.
pub trait CompletionBackend: Send + Sync {
    /// Model identifier, used in latency logs.
    fn model(&self) -> &str;

    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, AiLlmError>>;
}

impl CompletionBackend for LlmServiceProfiles {
    fn model(&self) -> &str {
        &self.profiles().0.model
    }

    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, AiLlmError>> {
        Box::pin(self.generate(prompt))
    }
}

/// Sends prompts to a [`CompletionBackend`] and measures wall-clock latency.
#[derive(Clone)]
pub struct ModelInvoker {
    backend: Arc<dyn CompletionBackend>,
}

impl ModelInvoker {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Runs one completion. No retries.
    ///
    /// # Errors
    /// - [`ContextorError::Cancelled`] if `cancel` fires before the backend answers.
    /// - [`ContextorError::ModelInvocationFailed`] for any backend failure.
    pub async fn generate(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<ModelResponse, ContextorError> {
        let model = self.backend.model();
        debug!(model, prompt_len = prompt.len(), "invoking model");

        let started = Instant::now();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(model, "model call cancelled");
                return Err(ContextorError::Cancelled);
            }
            res = self.backend.complete(prompt) => res,
        };
        let elapsed = started.elapsed();

        match outcome {
            Ok(text) => {
                info!("{} response time: {}", model, format_elapsed(elapsed));
                Ok(ModelResponse { text, elapsed })
            }
            Err(err) => {
                warn!(model, error = %err, "model call failed after {}", format_elapsed(elapsed));
                Err(ContextorError::ModelInvocationFailed(err))
            }
        }
    }
}

/// Formats a duration as `H:MM:SS`, dropping sub-second precision.
pub fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
