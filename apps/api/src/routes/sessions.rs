//! Session lifecycle endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::GenerationResult;
use crate::state::AppState;
use crate::trends::models::DatasetSource;

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub uploaded_dataset: Option<DatasetSource>,
    pub last_result: Option<GenerationResult>,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = state.sessions.create().await;
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

/// GET /api/v1/sessions/:id
///
/// The session's upload (if any) and its last generated result.
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let response = state
        .sessions
        .read(session_id, |s| SessionResponse {
            session_id,
            created_at: s.created_at,
            uploaded_dataset: s.uploaded_catalog().map(|c| c.source.clone()),
            last_result: s.last_result().cloned(),
        })
        .await?;
    Ok(Json(response))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.end(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
