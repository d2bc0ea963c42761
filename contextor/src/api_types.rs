//! Public result types of the query pipeline.

use std::fmt;
use std::time::Duration;

use rag_store::RetrievedChunk;
use serde::Serialize;

/// Raw completion text plus how long the backend took.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelResponse {
    pub text: String,
    pub elapsed: Duration,
}

/// Final answer with provenance.
///
/// `sources[i]` is the id of `chunks[i]` (or `None` when that chunk has no
/// id); the two vectors always have the same length and are not deduplicated.
///
/// `Display` renders the canonical console form:
///
/// ```
/// use contextor::FormattedAnswer;
/// let a = FormattedAnswer {
///     answer: "4".into(),
///     sources: vec![Some("doc1".into()), None],
///     prompt: String::new(),
///     chunks: vec![],
///     elapsed_secs: 0,
/// };
/// assert_eq!(a.to_string(), "Response: 4\nSources: [\"doc1\",null]");
/// ```
#[derive(Clone, Debug, Serialize)]
pub struct FormattedAnswer {
    pub answer: String,
    pub sources: Vec<Option<String>>,
    /// Exact prompt sent to the model.
    pub prompt: String,
    /// Retrieved chunks in rank order.
    pub chunks: Vec<RetrievedChunk>,
    /// Model latency truncated to whole seconds.
    pub elapsed_secs: u64,
}

impl FormattedAnswer {
    pub fn new(response: ModelResponse, prompt: String, chunks: Vec<RetrievedChunk>) -> Self {
        let sources = chunks.iter().map(RetrievedChunk::source_id).collect();
        Self {
            answer: response.text,
            sources,
            prompt,
            chunks,
            elapsed_secs: response.elapsed.as_secs(),
        }
    }
}

impl fmt::Display for FormattedAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources = serde_json::to_string(&self.sources).map_err(|_| fmt::Error)?;
        write!(f, "Response: {}\nSources: {}", self.answer, sources)
    }
}
