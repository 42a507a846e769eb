//! HTTP front end for the tokenize service

mod handlers;


use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

pub use handlers::{
    health_handler, tokenize_handler, ApiError, AppState, ErrorBody, ErrorResponse,
    HealthResponse,
};

use crate::config::ServiceConfig;
use crate::service::TokenizeService;
use crate::tokenizer::{HubLoader, TokenizerRegistry};

/// Build the axum router over shared state
///
/// Request bodies are capped at `config.max_body_bytes`, replacing axum's
/// default limit.
pub fn create_router(state: Arc<AppState>, config: &ServiceConfig) -> Router {
    let router = Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        .route("/tokenize", post(tokenize_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http());

    if config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router.layer(cors)
    } else {
        router
    }
}

pub struct HttpServer {
    config: ServiceConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    /// Create a server backed by the hub loader rooted at `config.models_dir`
    pub fn new(config: ServiceConfig) -> Self {
        let loader = HubLoader::new(config.models_dir.clone())
            .with_local_paths(config.allow_local_models);
        let registry =
            TokenizerRegistry::new(loader).with_default_credential(config.hf_token.clone());
        let service = TokenizeService::new(Arc::new(registry), config.limits());
        Self::with_service(config, Arc::new(service))
    }

    /// Create with a pre-built service (for testing or custom loaders)
    pub fn with_service(config: ServiceConfig, service: Arc<TokenizeService>) -> Self {
        Self {
            config,
            state: Arc::new(AppState::new(service)),
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone(), &self.config)
    }

    /// Serve until ctrl-c
    pub async fn serve(self) -> std::io::Result<()> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!(
            addr = %addr,
            models_dir = %self.config.models_dir.display(),
            local_models = self.config.allow_local_models,
            "tokenize service listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("tokenize service stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
