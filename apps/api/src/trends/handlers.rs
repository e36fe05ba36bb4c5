//! Axum route handlers for the trends catalog and auto-selection.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ideation::briefing::BriefingInput;
use crate::state::AppState;
use crate::trends::models::{DatasetSource, TrendCatalog, TrendRecord, TREND_COLUMNS};
use crate::trends::scoring::{auto_select, rank, RankedTrend};

/// Multipart field carrying the uploaded CSV.
const UPLOAD_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DatasetResponse {
    pub source: DatasetSource,
    pub content_hash: String,
    pub record_count: usize,
}

impl From<&TrendCatalog> for DatasetResponse {
    fn from(catalog: &TrendCatalog) -> Self {
        Self {
            source: catalog.source.clone(),
            content_hash: catalog.content_hash.clone(),
            record_count: catalog.records.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub source: DatasetSource,
    pub columns: [&'static str; 5],
    pub trends: Vec<TrendRecord>,
}

#[derive(Debug, Serialize)]
pub struct AutoSelectResponse {
    pub selected: Vec<String>,
    pub ranking: Vec<RankedTrend>,
}

// ────────────────────────────────────────────────────────────────────────────
// Catalog resolution
// ────────────────────────────────────────────────────────────────────────────

/// The catalog a session works with: its upload if any, else the configured default.
pub async fn resolve_catalog(state: &AppState, session_id: Uuid) -> Result<TrendCatalog, AppError> {
    let uploaded = state
        .sessions
        .read(session_id, |s| s.uploaded_catalog().cloned())
        .await?;

    match uploaded {
        Some(catalog) => Ok(catalog),
        None => Ok(state.loader.load_path(&state.config.trends_csv).await?),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions/:id/dataset
///
/// Replaces the session's catalog with an uploaded CSV (multipart field `file`).
/// A malformed upload is rejected and the previous catalog stays in place.
pub async fn handle_upload_dataset(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<DatasetResponse>, AppError> {
    // Fail fast on unknown sessions before reading the body
    state.sessions.read(session_id, |_| ()).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload.csv").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        let catalog = state
            .loader
            .load_bytes(DatasetSource::Upload { file_name }, &bytes)
            .await?;
        let response = DatasetResponse::from(&catalog);

        state
            .sessions
            .update(session_id, |s| s.set_uploaded_catalog(catalog))
            .await?;

        info!(
            "Session {session_id} uploaded a catalog with {} trends",
            response.record_count
        );
        return Ok(Json(response));
    }

    Err(AppError::Validation(format!(
        "Multipart body must contain a `{UPLOAD_FIELD}` field with the CSV catalog"
    )))
}

/// DELETE /api/v1/sessions/:id/dataset
///
/// Drops the uploaded catalog; the session goes back to the default one.
pub async fn handle_reset_dataset(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let had_upload = state
        .sessions
        .update(session_id, |s| s.clear_uploaded_catalog())
        .await?;
    if had_upload {
        info!("Session {session_id} reverted to the default catalog");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sessions/:id/trends
pub async fn handle_get_trends(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<TrendsResponse>, AppError> {
    let catalog = resolve_catalog(&state, session_id).await?;
    Ok(Json(TrendsResponse {
        source: catalog.source.clone(),
        columns: TREND_COLUMNS,
        trends: catalog.records.to_vec(),
    }))
}

/// POST /api/v1/sessions/:id/selection/auto
///
/// Scores the catalog against the briefing and returns the pre-selection.
pub async fn handle_auto_select(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(briefing): Json<BriefingInput>,
) -> Result<Json<AutoSelectResponse>, AppError> {
    let catalog = resolve_catalog(&state, session_id).await?;
    let query = briefing.query_text();

    let selected = auto_select(&catalog.records, &query);
    let ranking = rank(&catalog.records, &query);
    info!(
        "Session {session_id} auto-selected {} of {} trends",
        selected.len(),
        catalog.records.len()
    );

    Ok(Json(AutoSelectResponse { selected, ranking }))
}
