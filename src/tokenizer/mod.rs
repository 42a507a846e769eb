mod basic;
mod error;
mod hub;
mod registry;


use std::sync::Arc;

pub use basic::BasicTokenizer;
pub use error::TokenizeError;
pub use hub::{HfTokenizer, HubLoader, TOKENIZER_FILE, validate_repo_id};
pub use registry::TokenizerRegistry;

/// Converts text into an ordered sequence of token strings
///
/// Implementations must be deterministic: the same text always yields the
/// same tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizeError>;
}

/// Resolves a model id (and optional credential) into a ready tokenizer
///
/// Called from the blocking pool; implementations may do file or network IO.
pub trait ModelLoader: Send + Sync {
    fn load(&self, model: &str, credential: Option<&str>)
        -> Result<Arc<dyn Tokenizer>, TokenizeError>;

    /// Canonical id used to cache the tokenizer for `model`
    ///
    /// Rejects ids the loader would never serve, before any slot is created.
    fn cache_key(&self, model: &str) -> Result<String, TokenizeError> {
        Ok(model.to_string())
    }
}
