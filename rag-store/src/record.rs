//! Core data models used by the library.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One persisted row of a local index: text, its vector and free-form metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub text: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl IndexRecord {
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            embedding,
            metadata: Map::new(),
        }
    }

    /// Builder-style helper that sets `metadata["id"]`.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.insert("id".into(), Value::String(id.into()));
        self
    }
}

/// A single retrieval hit: chunk text, similarity score and metadata.
///
/// Higher `score` means more relevant, whatever distance the index uses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub content: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl RetrievedChunk {
    /// Source identifier taken from `metadata["id"]`.
    ///
    /// Strings are returned as-is and numbers are stringified; any other
    /// shape (or a missing key) yields `None`.
    pub fn source_id(&self) -> Option<String> {
        match self.metadata.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
