use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info_span, Instrument};
use uuid::Uuid;

use crate::service::{ServiceError, TokenizeRequest, TokenizeResponse, TokenizeService};

/// Shared state for handlers
pub struct AppState {
    pub service: Arc<TokenizeService>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(service: Arc<TokenizeService>) -> Self {
        Self {
            service,
            started_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub cached_models: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// A service error tagged with the request it belongs to
#[derive(Debug)]
pub struct ApiError {
    pub error: ServiceError,
    pub request_id: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.error {
            ServiceError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::InvalidChunkParameters(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ServiceError::ModelUnavailable(_) => StatusCode::NOT_FOUND,
            ServiceError::TokenizationFailed(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(request_id = %self.request_id, code = self.error.code(), error = %self.error, "tokenize request failed");
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error.code().to_string(),
                message: self.error.to_string(),
                request_id: self.request_id,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Health check; also answers HEAD through the GET route
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: state.started_at,
        cached_models: state.service.registry().cached_models(),
    })
}

/// Tokenize one text or a batch
pub async fn tokenize_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TokenizeRequest>, JsonRejection>,
) -> Result<Json<TokenizeResponse>, ApiError> {
    let request_id = Uuid::new_v4().to_string();

    let Json(request) = payload.map_err(|rejection| ApiError {
        error: rejection_error(&rejection),
        request_id: request_id.clone(),
    })?;

    let span = info_span!("tokenize", request_id = %request_id, model = %request.model);
    state
        .service
        .handle(request)
        .instrument(span)
        .await
        .map(Json)
        .map_err(|error| ApiError { error, request_id })
}

/// Body limit rejections keep their 413; every other decode failure is a malformed request
fn rejection_error(rejection: &JsonRejection) -> ServiceError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::PayloadTooLarge(rejection.body_text())
    } else {
        ServiceError::MalformedRequest(rejection.body_text())
    }
}
