use serde::{Deserialize, Serialize};

use crate::chunker::Chunk;

/// Tokens, fingerprint and optional chunks for one input text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResult {
    pub text: String,
    pub sha256: String,
    pub tokens: Vec<String>,
    /// Omitted entirely when chunking was not requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<Vec<Chunk>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementError {
    pub code: String,
    pub message: String,
}

/// Marker for a batch element whose text could not be tokenized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFailure {
    pub text: String,
    pub error: ElementError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOutcome {
    Completed(TextResult),
    Failed(TextFailure),
}

impl TextOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: Vec<TextOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenizeResponse {
    Single(TextResult),
    Batch(BatchResponse),
}
