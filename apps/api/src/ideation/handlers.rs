//! Axum route handlers for idea generation and export.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ideation::briefing::BriefingInput;
use crate::ideation::generator::{
    generate_ideas, GenerateIdeasRequest, GenerationOutcome, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE, MAX_SELECTED_TRENDS, MAX_TOKENS_RANGE, TEMPERATURE_RANGE,
};
use crate::session::{EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME};
use crate::state::AppState;
use crate::trends::handlers::resolve_catalog;
use crate::trends::scoring::AUTO_SELECT_LIMIT;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DefaultsResponse {
    pub briefing: BriefingInput,
    pub model: String,
    pub temperature: f32,
    pub temperature_range: [f32; 2],
    pub max_tokens: u32,
    pub max_tokens_range: [u32; 2],
    pub max_selected_trends: usize,
    pub auto_select_limit: usize,
    pub credential_configured: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/defaults
///
/// Seed values for the briefing form and the generation knobs.
pub async fn handle_defaults(State(state): State<AppState>) -> Json<DefaultsResponse> {
    Json(DefaultsResponse {
        briefing: BriefingInput::seed(),
        model: state.config.openai_model.clone(),
        temperature: DEFAULT_TEMPERATURE,
        temperature_range: [*TEMPERATURE_RANGE.start(), *TEMPERATURE_RANGE.end()],
        max_tokens: DEFAULT_MAX_TOKENS,
        max_tokens_range: [*MAX_TOKENS_RANGE.start(), *MAX_TOKENS_RANGE.end()],
        max_selected_trends: MAX_SELECTED_TRENDS,
        auto_select_limit: AUTO_SELECT_LIMIT,
        credential_configured: state.config.openai_api_key.is_some(),
    })
}

/// POST /api/v1/sessions/:id/generate
///
/// Generates ideas and, on a non-empty success, stores them as the session's
/// last result. Any failure leaves the previous result in place.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<GenerateIdeasRequest>,
) -> Result<Json<GenerationOutcome>, AppError> {
    let catalog = resolve_catalog(&state, session_id).await?;

    let outcome = generate_ideas(
        state.llm.as_ref(),
        &catalog,
        &state.config.openai_model,
        request,
    )
    .await?;

    if outcome.text.is_empty() {
        warn!("Session {session_id}: model returned empty text, keeping previous result");
    } else {
        let (text, model) = (outcome.text.clone(), outcome.model.clone());
        state
            .sessions
            .update(session_id, |s| s.record_result(text, model))
            .await?;
        info!("Session {session_id}: stored {} chars of ideas", outcome.text.len());
    }

    Ok(Json(outcome))
}

/// GET /api/v1/sessions/:id/export
///
/// Downloads the last result as `ideias.md`. Without one, answers with an
/// informational JSON body instead of an error.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let export = state.sessions.read(session_id, |s| s.export()).await?;

    let response = match export {
        Some(bytes) => (
            [
                (header::CONTENT_TYPE, EXPORT_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        None => Json(json!({
            "status": "empty",
            "message": "Generate ideas first to export."
        }))
        .into_response(),
    };

    Ok(response)
}
