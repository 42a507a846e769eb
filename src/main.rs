use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chunktown::{
    HttpServer, HubLoader, LogFormat, LogLevel, LoggingConfig, RequestLimits, ServiceConfig,
    TokenizeRequest, TokenizeService, TokenizerRegistry, telemetry,
};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "chunktown", version, about = "Tokenize text and split it into overlapping token chunks")]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, value_enum, default_value = "info")]
    log_level: LogLevel,

    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(long, default_value_t = 8000)]
        port: u16,

        /// Where downloaded tokenizers are kept
        #[arg(long, default_value = "./models")]
        models_dir: PathBuf,

        /// Hub token used when a request carries none
        #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
        hf_token: Option<String>,

        #[arg(long, default_value_t = RequestLimits::default().max_batch_size)]
        max_batch_size: usize,

        #[arg(long, default_value_t = RequestLimits::default().max_text_bytes)]
        max_text_bytes: usize,

        /// Max request body size in bytes
        #[arg(long, default_value_t = ServiceConfig::default().max_body_bytes)]
        max_body_bytes: usize,

        /// Accept model ids naming local files or directories
        #[arg(long)]
        allow_local_models: bool,

        #[arg(long)]
        no_cors: bool,
    },

    /// Tokenize texts once and print the JSON response
    Tokenize {
        /// Hub model id, local tokenizer path, or `basic`
        #[arg(long)]
        model: String,

        #[arg(long)]
        max_tokens_per_chunk: Option<i64>,

        #[arg(long)]
        token_overlap: Option<i64>,

        #[arg(long)]
        max_chunk_length: Option<i64>,

        #[arg(long, default_value = "./models")]
        models_dir: PathBuf,

        #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
        hf_token: Option<String>,

        #[arg(required = true)]
        texts: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        format: cli.log_format,
        level: cli.log_level,
    };
    telemetry::try_init(&logging)
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize logging")?;

    match cli.command {
        Command::Serve {
            host,
            port,
            models_dir,
            hf_token,
            max_batch_size,
            max_text_bytes,
            max_body_bytes,
            allow_local_models,
            no_cors,
        } => {
            let config = ServiceConfig::default()
                .with_host(host)
                .with_port(port)
                .with_models_dir(models_dir)
                .with_hf_token(hf_token)
                .with_limits(RequestLimits {
                    max_batch_size,
                    max_text_bytes,
                })
                .with_max_body_bytes(max_body_bytes)
                .with_local_models(allow_local_models)
                .with_cors(!no_cors)
                .with_logging(logging);

            std::fs::create_dir_all(&config.models_dir).with_context(|| {
                format!("Failed to create models directory {}", config.models_dir.display())
            })?;
            info!(addr = %config.bind_addr(), "starting tokenize service");

            HttpServer::new(config)
                .serve()
                .await
                .context("HTTP server failed")?;
        }
        Command::Tokenize {
            model,
            max_tokens_per_chunk,
            token_overlap,
            max_chunk_length,
            models_dir,
            hf_token,
            mut texts,
        } => {
            std::fs::create_dir_all(&models_dir).with_context(|| {
                format!("Failed to create models directory {}", models_dir.display())
            })?;

            let loader = HubLoader::new(models_dir).with_local_paths(true);
            let registry = TokenizerRegistry::new(loader).with_default_credential(hf_token);
            let service = TokenizeService::new(Arc::new(registry), RequestLimits::default());

            let mut request = if texts.len() == 1 {
                TokenizeRequest::single(model, texts.remove(0))
            } else {
                TokenizeRequest::batch(model, texts)
            };
            request.max_tokens_per_chunk = max_tokens_per_chunk;
            request.token_overlap = token_overlap;
            request.max_chunk_length = max_chunk_length;

            let response = service.handle(request).await?;
            let json = serde_json::to_string_pretty(&response)
                .context("Failed to serialize response")?;
            println!("{}", json);
        }
    }

    Ok(())
}
