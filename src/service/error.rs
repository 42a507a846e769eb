use thiserror::Error;

use crate::chunker::ChunkParameterError;
use crate::tokenizer::TokenizeError;

/// Request-level failures
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Invalid chunk parameters: {0}")]
    InvalidChunkParameters(#[from] ChunkParameterError),

    #[error("{0}")]
    ModelUnavailable(String),

    #[error("{0}")]
    Authentication(String),

    #[error("Tokenization failed: {0}")]
    TokenizationFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedRequest(_) => "malformed_request",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::InvalidChunkParameters(_) => "invalid_chunk_parameters",
            Self::ModelUnavailable(_) => "model_unavailable",
            Self::Authentication(_) => "authentication_error",
            Self::TokenizationFailed(_) => "tokenization_failed",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<TokenizeError> for ServiceError {
    fn from(err: TokenizeError) -> Self {
        match err {
            TokenizeError::ModelUnavailable { .. } => Self::ModelUnavailable(err.to_string()),
            TokenizeError::Authentication { .. } => Self::Authentication(err.to_string()),
            TokenizeError::InvalidModelId { .. } => Self::MalformedRequest(err.to_string()),
            TokenizeError::EncodingFailed(message) => Self::TokenizationFailed(message),
        }
    }
}
