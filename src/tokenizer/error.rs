use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("Model '{model}' is unavailable: {reason}")]
    ModelUnavailable { model: String, reason: String },

    #[error("Authentication failed for model '{model}': {reason}")]
    Authentication { model: String, reason: String },

    #[error("Invalid model id '{model}': {reason}")]
    InvalidModelId { model: String, reason: String },

    #[error("Failed to encode text: {0}")]
    EncodingFailed(String),
}

impl TokenizeError {
    pub fn unavailable(model: &str, reason: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            model: model.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_id(model: &str, reason: impl Into<String>) -> Self {
        Self::InvalidModelId {
            model: model.to_string(),
            reason: reason.into(),
        }
    }
}
