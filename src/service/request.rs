use serde::{Deserialize, Serialize};

use super::ServiceError;
use crate::chunker::ChunkParameters;

/// Maximum model id length in bytes
pub const MAX_MODEL_ID_LENGTH: usize = 256;

/// Body of a tokenize call: one `text` or a `texts` batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenizeRequest {
    pub model: String,
    #[serde(default)]
    pub huggingface_api_key: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub texts: Option<Vec<String>>,
    #[serde(default)]
    pub max_chunk_length: Option<i64>,
    #[serde(default)]
    pub max_tokens_per_chunk: Option<i64>,
    #[serde(default)]
    pub token_overlap: Option<i64>,
}

/// Size limits applied before any tokenization work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub max_batch_size: usize,
    pub max_text_bytes: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_batch_size: 256,
            max_text_bytes: 4 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inputs {
    Single(String),
    Batch(Vec<String>),
}

/// A request that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub model: String,
    pub credential: Option<String>,
    pub inputs: Inputs,
    /// `None` when the caller asked for tokens only
    pub chunking: Option<ChunkParameters>,
}

impl TokenizeRequest {
    pub fn single(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn batch<S: Into<String>>(model: impl Into<String>, texts: impl IntoIterator<Item = S>) -> Self {
        Self {
            model: model.into(),
            texts: Some(texts.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn with_chunking(mut self, max_tokens_per_chunk: i64, token_overlap: i64) -> Self {
        self.max_tokens_per_chunk = Some(max_tokens_per_chunk);
        self.token_overlap = Some(token_overlap);
        self
    }

    pub fn with_max_chunk_length(mut self, max_chunk_length: i64) -> Self {
        self.max_chunk_length = Some(max_chunk_length);
        self
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.huggingface_api_key = Some(credential.into());
        self
    }

    /// Check the request shape, sizes and chunk parameters
    pub fn into_validated(self, limits: &RequestLimits) -> Result<ValidatedRequest, ServiceError> {
        let model = self.model.trim().to_string();
        if model.is_empty() {
            return Err(ServiceError::MalformedRequest(
                "model cannot be empty".to_string(),
            ));
        }
        if model.len() > MAX_MODEL_ID_LENGTH {
            return Err(ServiceError::MalformedRequest(format!(
                "model exceeds maximum length of {} characters",
                MAX_MODEL_ID_LENGTH
            )));
        }

        let inputs = match (self.text, self.texts) {
            (Some(text), None) => Inputs::Single(text),
            (None, Some(texts)) => Inputs::Batch(texts),
            (Some(_), Some(_)) => {
                return Err(ServiceError::MalformedRequest(
                    "provide either `text` or `texts`, not both".to_string(),
                ));
            }
            (None, None) => {
                return Err(ServiceError::MalformedRequest(
                    "one of `text` or `texts` is required".to_string(),
                ));
            }
        };
        check_sizes(&inputs, limits)?;

        let chunking = match self.max_tokens_per_chunk {
            Some(max_tokens) => Some(ChunkParameters::from_raw(
                max_tokens,
                self.token_overlap,
                self.max_chunk_length,
            )?),
            None => None,
        };

        let credential = self
            .huggingface_api_key
            .filter(|key| !key.trim().is_empty());

        Ok(ValidatedRequest {
            model,
            credential,
            inputs,
            chunking,
        })
    }
}

fn check_sizes(inputs: &Inputs, limits: &RequestLimits) -> Result<(), ServiceError> {
    let texts: &[String] = match inputs {
        Inputs::Single(text) => std::slice::from_ref(text),
        Inputs::Batch(texts) => {
            if texts.len() > limits.max_batch_size {
                return Err(ServiceError::MalformedRequest(format!(
                    "batch of {} texts exceeds maximum of {}",
                    texts.len(),
                    limits.max_batch_size
                )));
            }
            texts
        }
    };

    if let Some((idx, text)) = texts
        .iter()
        .enumerate()
        .find(|(_, text)| text.len() > limits.max_text_bytes)
    {
        return Err(ServiceError::MalformedRequest(format!(
            "text {} is {} bytes, exceeding maximum of {} bytes",
            idx,
            text.len(),
            limits.max_text_bytes
        )));
    }

    Ok(())
}
