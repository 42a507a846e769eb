use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use super::{ModelLoader, TokenizeError, Tokenizer};

type Slot = Arc<OnceCell<Arc<dyn Tokenizer>>>;

/// Process-wide cache of loaded tokenizers, keyed by model id
///
/// Each model is loaded at most once even under concurrent cold requests.
/// Failed loads are not cached, so a later request retries.
pub struct TokenizerRegistry {
    loader: Arc<dyn ModelLoader>,
    slots: DashMap<String, Slot>,
    default_credential: Option<String>,
}

impl TokenizerRegistry {
    pub fn new(loader: impl ModelLoader + 'static) -> Self {
        Self {
            loader: Arc::new(loader),
            slots: DashMap::new(),
            default_credential: None,
        }
    }

    /// Credential used when a request does not carry its own
    pub fn with_default_credential(mut self, credential: Option<String>) -> Self {
        self.default_credential = credential;
        self
    }

    /// Return the cached tokenizer for `model`, loading it on first use
    ///
    /// Slots are keyed by the loader's canonical id and not by credential:
    /// the credential only takes part in the first load. Once a gated
    /// tokenizer is cached it is served to every caller, with or without a
    /// credential.
    pub async fn get_or_load(
        &self,
        model: &str,
        credential: Option<&str>,
    ) -> Result<Arc<dyn Tokenizer>, TokenizeError> {
        let key = self.loader.cache_key(model)?;
        let model = key.as_str();

        let slot = self
            .slots
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .value()
            .clone();

        if let Some(tokenizer) = slot.get() {
            debug!(model, "using cached tokenizer");
            return Ok(tokenizer.clone());
        }

        let credential = credential
            .map(str::to_string)
            .or_else(|| self.default_credential.clone());

        let result = slot
            .get_or_try_init(|| self.load_blocking(model.to_string(), credential))
            .await
            .cloned();

        if let Err(e) = &result {
            error!(model, error = %e, "failed to load tokenizer");
            self.slots.remove_if(model, |_, slot| !slot.initialized());
        }

        result
    }

    async fn load_blocking(
        &self,
        model: String,
        credential: Option<String>,
    ) -> Result<Arc<dyn Tokenizer>, TokenizeError> {
        info!(model = %model, "loading tokenizer");
        let loader = self.loader.clone();
        let task_model = model.clone();

        tokio::task::spawn_blocking(move || loader.load(&task_model, credential.as_deref()))
            .await
            .map_err(|e| TokenizeError::unavailable(&model, format!("loader task failed: {}", e)))?
    }

    pub fn is_cached(&self, model: &str) -> bool {
        self.slots
            .get(model)
            .map(|slot| slot.initialized())
            .unwrap_or(false)
    }

    /// Model ids with a loaded tokenizer, sorted
    pub fn cached_models(&self) -> Vec<String> {
        let mut models: Vec<String> = self
            .slots
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| entry.key().clone())
            .collect();
        models.sort();
        models
    }
}
