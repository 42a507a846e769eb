use std::path::{Path, PathBuf};
use std::sync::Arc;

use hf_hub::api::sync::{ApiBuilder, ApiError};
use tokenizers::Tokenizer as HfModel;
use tracing::{debug, info};

use super::{BasicTokenizer, ModelLoader, TokenizeError, Tokenizer};

/// File fetched from a model repository
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Tokenizer backed by a Hugging Face `tokenizer.json`
pub struct HfTokenizer {
    inner: HfModel,
}

impl HfTokenizer {
    pub fn from_file(model: &str, path: &Path) -> Result<Self, TokenizeError> {
        let inner = HfModel::from_file(path).map_err(|e| {
            TokenizeError::unavailable(
                model,
                format!("failed to read {}: {}", path.display(), e),
            )
        })?;
        Ok(Self { inner })
    }
}

impl Tokenizer for HfTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizeError> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| TokenizeError::EncodingFailed(e.to_string()))?;
        Ok(encoding.get_tokens().to_vec())
    }
}

/// Resolves model ids to tokenizers from the Hugging Face hub
///
/// Hub downloads land in `models_dir`, which persists across restarts.
/// Local `tokenizer.json` files and model directories are only considered
/// when enabled with [`HubLoader::with_local_paths`]; otherwise every id must
/// be a hub repository id and is checked without touching the filesystem.
pub struct HubLoader {
    models_dir: PathBuf,
    local_paths: bool,
}

impl HubLoader {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            local_paths: false,
        }
    }

    /// Allow model ids naming a local file or directory
    pub fn with_local_paths(mut self, enabled: bool) -> Self {
        self.local_paths = enabled;
        self
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn local_paths(&self) -> bool {
        self.local_paths
    }

    /// Canonical local path for `model`, if local paths are enabled and it exists
    fn local_path(&self, model: &str) -> Option<PathBuf> {
        if !self.local_paths {
            return None;
        }
        Path::new(model).canonicalize().ok()
    }

    /// Find the `tokenizer.json` for a model, downloading it if needed
    fn resolve(&self, model: &str, credential: Option<&str>) -> Result<PathBuf, TokenizeError> {
        if let Some(local) = self.local_path(model) {
            if local.is_file() {
                return Ok(local);
            }
            let candidate = local.join(TOKENIZER_FILE);
            if candidate.is_file() {
                return Ok(candidate);
            }
            return Err(TokenizeError::unavailable(
                model,
                format!("no {} in directory {}", TOKENIZER_FILE, local.display()),
            ));
        }

        validate_repo_id(model)?;

        debug!(model, models_dir = %self.models_dir.display(), "fetching tokenizer from hub");
        let api = ApiBuilder::new()
            .with_cache_dir(self.models_dir.clone())
            .with_token(credential.map(str::to_string))
            .with_progress(false)
            .build()
            .map_err(|e| TokenizeError::unavailable(model, format!("hub client: {}", e)))?;

        api.model(model.to_string())
            .get(TOKENIZER_FILE)
            .map_err(|e| classify_hub_error(model, hub_status(&e), &e.to_string()))
    }
}

impl ModelLoader for HubLoader {
    fn load(&self, model: &str, credential: Option<&str>) -> Result<Arc<dyn Tokenizer>, TokenizeError> {
        if model == BasicTokenizer::MODEL_ID {
            return Ok(Arc::new(BasicTokenizer));
        }

        let path = self.resolve(model, credential)?;
        let tokenizer = HfTokenizer::from_file(model, &path)?;
        info!(model, path = %path.display(), "tokenizer loaded");

        Ok(Arc::new(tokenizer))
    }

    fn cache_key(&self, model: &str) -> Result<String, TokenizeError> {
        if model == BasicTokenizer::MODEL_ID {
            return Ok(model.to_string());
        }
        if let Some(local) = self.local_path(model) {
            return Ok(local.to_string_lossy().into_owned());
        }
        validate_repo_id(model)?;
        Ok(model.to_string())
    }
}

/// Check that `model` is a hub repository id: `name` or `namespace/name`
///
/// Absolute paths, `.`/`..` segments, empty segments and characters outside
/// `[A-Za-z0-9._-]` are rejected.
pub fn validate_repo_id(model: &str) -> Result<(), TokenizeError> {
    if model.is_empty() {
        return Err(TokenizeError::invalid_id(model, "empty id"));
    }
    if model.starts_with('/') {
        return Err(TokenizeError::invalid_id(model, "absolute paths are not allowed"));
    }

    let segments: Vec<&str> = model.split('/').collect();
    if segments.len() > 2 {
        return Err(TokenizeError::invalid_id(
            model,
            "expected `name` or `namespace/name`",
        ));
    }

    for segment in segments {
        match segment {
            "" => return Err(TokenizeError::invalid_id(model, "empty path segment")),
            "." | ".." => {
                return Err(TokenizeError::invalid_id(
                    model,
                    "relative path segments are not allowed",
                ));
            }
            _ if segment.contains("..") || segment.starts_with('.') => {
                return Err(TokenizeError::invalid_id(
                    model,
                    format!("invalid segment '{}'", segment),
                ));
            }
            _ => {}
        }

        if let Some(c) = segment
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(TokenizeError::invalid_id(
                model,
                format!("unexpected character {:?}", c),
            ));
        }
    }

    Ok(())
}

/// HTTP status of a failed hub request, if the hub answered at all
fn hub_status(err: &ApiError) -> Option<u16> {
    match err {
        ApiError::RequestError(inner) => match inner.as_ref() {
            ureq::Error::Status(code, _) => Some(*code),
            _ => None,
        },
        _ => None,
    }
}

/// Map a hub download failure onto an adapter error
///
/// The hub answers 401/403 both for gated repositories and for bad tokens.
pub(crate) fn classify_hub_error(model: &str, status: Option<u16>, message: &str) -> TokenizeError {
    match status {
        Some(401) | Some(403) => TokenizeError::Authentication {
            model: model.to_string(),
            reason: format!("hub refused access (gated model or invalid token): {}", message),
        },
        _ => TokenizeError::unavailable(model, message),
    }
}
