//! Configuration for the tokenize service

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::service::RequestLimits;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Log severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
}

fn default_log_format() -> LogFormat {
    LogFormat::Text
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            level: default_log_level(),
        }
    }
}

/// Configuration for the HTTP tokenize service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Host to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory where downloaded tokenizers are cached
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    /// Hub credential used when a request carries none
    #[serde(default)]
    pub hf_token: Option<String>,

    /// Max texts accepted in one batch
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Max UTF-8 bytes accepted per text
    #[serde(default = "default_max_text_bytes")]
    pub max_text_bytes: usize,

    /// Max HTTP request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Accept model ids naming local files or directories
    #[serde(default)]
    pub allow_local_models: bool,

    /// Allow cross-origin requests from any origin
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("./models")
}

fn default_max_batch_size() -> usize {
    RequestLimits::default().max_batch_size
}

fn default_max_text_bytes() -> usize {
    RequestLimits::default().max_text_bytes
}

// Room for a max-size text after JSON escaping
fn default_max_body_bytes() -> usize {
    32 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            models_dir: default_models_dir(),
            hf_token: None,
            max_batch_size: default_max_batch_size(),
            max_text_bytes: default_max_text_bytes(),
            max_body_bytes: default_max_body_bytes(),
            allow_local_models: false,
            cors_enabled: default_true(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_models_dir(mut self, models_dir: impl Into<PathBuf>) -> Self {
        self.models_dir = models_dir.into();
        self
    }

    /// Blank tokens are treated as absent
    pub fn with_hf_token(mut self, token: Option<String>) -> Self {
        self.hf_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_limits(mut self, limits: RequestLimits) -> Self {
        self.max_batch_size = limits.max_batch_size;
        self.max_text_bytes = limits.max_text_bytes;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn with_local_models(mut self, allowed: bool) -> Self {
        self.allow_local_models = allowed;
        self
    }

    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.cors_enabled = enabled;
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Get the HTTP bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn limits(&self) -> RequestLimits {
        RequestLimits {
            max_batch_size: self.max_batch_size,
            max_text_bytes: self.max_text_bytes,
        }
    }
}
