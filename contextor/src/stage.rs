//! Linear state machine followed by one query.

use std::fmt;

use tracing::{debug, error};

/// Stages of a single query, in order. `Failed` is terminal and reachable from any stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    EmbeddingReady,
    Retrieved,
    PromptComposed,
    ModelInvoked,
    Formatted,
    Failed,
}

impl PipelineStage {
    /// The stage that legally follows this one on the success path.
    pub fn next(self) -> Option<Self> {
        use PipelineStage::*;
        match self {
            Start => Some(EmbeddingReady),
            EmbeddingReady => Some(Retrieved),
            Retrieved => Some(PromptComposed),
            PromptComposed => Some(ModelInvoked),
            ModelInvoked => Some(Formatted),
            Formatted | Failed => None,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::Start => "START",
            PipelineStage::EmbeddingReady => "EMBEDDING_READY",
            PipelineStage::Retrieved => "RETRIEVED",
            PipelineStage::PromptComposed => "PROMPT_COMPOSED",
            PipelineStage::ModelInvoked => "MODEL_INVOKED",
            PipelineStage::Formatted => "FORMATTED",
            PipelineStage::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Tracks and logs stage transitions of one query.
#[derive(Debug)]
pub(crate) struct StageTracker {
    current: PipelineStage,
}

impl StageTracker {
    pub(crate) fn new() -> Self {
        Self {
            current: PipelineStage::Start,
        }
    }

    pub(crate) fn current(&self) -> PipelineStage {
        self.current
    }

    /// Moves to the next success-path stage.
    pub(crate) fn advance(&mut self) -> PipelineStage {
        if let Some(next) = self.current.next() {
            debug!(from = %self.current, to = %next, "stage");
            self.current = next;
        }
        self.current
    }

    /// Moves to `Failed`, logging where the query stopped.
    pub(crate) fn fail(&mut self, reason: &dyn fmt::Display) {
        error!(at = %self.current, "query failed: {reason}");
        self.current = PipelineStage::Failed;
    }
}
