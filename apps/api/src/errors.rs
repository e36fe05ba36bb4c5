use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::{GenerationError, API_KEY_VAR};
use crate::trends::loader::DataSourceError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Data source error: {0}")]
    DataSource(#[from] DataSourceError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status and stable machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::DataSource(_) => (StatusCode::UNPROCESSABLE_ENTITY, "DATA_SOURCE_ERROR"),
            AppError::Generation(GenerationError::MissingCredential { .. }) => {
                (StatusCode::SERVICE_UNAVAILABLE, "MISSING_CREDENTIAL")
            }
            AppError::Generation(GenerationError::RemoteService { .. }) => {
                (StatusCode::BAD_GATEWAY, "REMOTE_SERVICE_ERROR")
            }
            AppError::Generation(GenerationError::MalformedResponse(_)) => {
                (StatusCode::BAD_GATEWAY, "MALFORMED_RESPONSE")
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::NotFound(msg) | AppError::Validation(msg) => {
                tracing::info!("Rejected request: {msg}");
                msg.clone()
            }
            AppError::DataSource(e) => {
                tracing::warn!("Data source error: {e}");
                format!("Could not load the trends catalog: {e}")
            }
            AppError::Generation(GenerationError::MissingCredential { .. }) => {
                tracing::warn!("Generation requested without a credential");
                format!("Set the {API_KEY_VAR} environment variable to generate ideas.")
            }
            AppError::Generation(e @ GenerationError::RemoteService { .. }) => {
                tracing::error!("LLM error: {e}");
                e.to_string()
            }
            AppError::Generation(e @ GenerationError::MalformedResponse(_)) => {
                tracing::error!("LLM returned an unexpected payload: {e}");
                e.to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
