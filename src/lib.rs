// Public API exports
pub mod chunker;
pub mod config;
pub mod fingerprint;
pub mod server;
pub mod service;
pub mod telemetry;
pub mod tokenizer;

// Re-export main types for convenience
pub use chunker::{Chunk, ChunkParameterError, ChunkParameters, chunk_tokens, window_spans};

pub use fingerprint::sha256_hex;

pub use tokenizer::{
    BasicTokenizer, HfTokenizer, HubLoader, ModelLoader, TokenizeError, Tokenizer,
    TokenizerRegistry,
};

pub use service::{
    BatchResponse, RequestLimits, ServiceError, TextOutcome, TextResult, TokenizeRequest,
    TokenizeResponse, TokenizeService,
};

pub use config::{LogFormat, LogLevel, LoggingConfig, ServiceConfig};

pub use server::{HttpServer, create_router};
