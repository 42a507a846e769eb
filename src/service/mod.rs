//! Request validation, per-text processing and response assembly
//!
//! A single-text request is handled as a batch of one and unwrapped at the
//! end, so both shapes share one code path.

mod error;
mod request;
mod response;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing::{debug, warn};

pub use error::ServiceError;
pub use request::{Inputs, MAX_MODEL_ID_LENGTH, RequestLimits, TokenizeRequest, ValidatedRequest};
pub use response::{
    BatchResponse, ElementError, TextFailure, TextOutcome, TextResult, TokenizeResponse,
};

use crate::chunker::{ChunkParameters, chunk_tokens};
use crate::fingerprint::sha256_hex;
use crate::tokenizer::{Tokenizer, TokenizerRegistry};

/// Tokenizes and chunks texts using tokenizers from a shared registry
pub struct TokenizeService {
    registry: Arc<TokenizerRegistry>,
    limits: RequestLimits,
}

impl TokenizeService {
    pub fn new(registry: Arc<TokenizerRegistry>, limits: RequestLimits) -> Self {
        Self { registry, limits }
    }

    pub fn registry(&self) -> &Arc<TokenizerRegistry> {
        &self.registry
    }

    pub fn limits(&self) -> &RequestLimits {
        &self.limits
    }

    /// Validate, tokenize and optionally chunk every text in the request
    ///
    /// Validation and model resolution failures reject the whole request.
    /// Once the tokenizer is available, a batch element that fails to encode
    /// is reported in place and its siblings still complete.
    pub async fn handle(&self, request: TokenizeRequest) -> Result<TokenizeResponse, ServiceError> {
        let validated = request.into_validated(&self.limits).map_err(|e| {
            warn!(code = e.code(), error = %e, "rejected tokenize request");
            e
        })?;

        let tokenizer = self
            .registry
            .get_or_load(&validated.model, validated.credential.as_deref())
            .await?;

        let (texts, single) = match validated.inputs {
            Inputs::Single(text) => (vec![text], true),
            Inputs::Batch(texts) => (texts, false),
        };
        let chunking = validated.chunking;
        let text_count = texts.len();

        let outcomes = tokio::task::spawn_blocking(move || {
            texts
                .into_iter()
                .map(|text| process_text(tokenizer.as_ref(), text, chunking.as_ref()))
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| ServiceError::Internal(format!("tokenization task failed: {}", e)))?;

        debug!(
            model = %validated.model,
            text_count,
            failed = outcomes.iter().filter(|o| !o.is_completed()).count(),
            "tokenize request processed"
        );

        if !single {
            return Ok(TokenizeResponse::Batch(BatchResponse { results: outcomes }));
        }

        match outcomes.into_iter().next() {
            Some(TextOutcome::Completed(result)) => Ok(TokenizeResponse::Single(result)),
            Some(TextOutcome::Failed(failure)) => {
                Err(ServiceError::TokenizationFailed(failure.error.message))
            }
            None => Err(ServiceError::Internal(
                "single-text request produced no result".to_string(),
            )),
        }
    }
}

/// Tokenize one text, fingerprint it and chunk it when parameters are given
pub fn process_text(
    tokenizer: &dyn Tokenizer,
    text: String,
    chunking: Option<&ChunkParameters>,
) -> TextOutcome {
    match tokenizer.tokenize(&text) {
        Ok(tokens) => {
            let sha256 = sha256_hex(&text);
            let chunks = chunking.map(|params| chunk_tokens(&tokens, params));

            TextOutcome::Completed(TextResult {
                text,
                sha256,
                tokens,
                chunks,
            })
        }
        Err(e) => {
            warn!(error = %e, text_bytes = text.len(), "failed to tokenize text");
            TextOutcome::Failed(TextFailure {
                text,
                error: ElementError {
                    code: "tokenization_failed".to_string(),
                    message: e.to_string(),
                },
            })
        }
    }
}
