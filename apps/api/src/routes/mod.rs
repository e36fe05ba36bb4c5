pub mod health;
pub mod sessions;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ideation::handlers as ideation;
use crate::state::AppState;
use crate::trends::handlers as trends;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/defaults", get(ideation::handle_defaults))
        // Sessions
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_end_session),
        )
        // Trend catalog
        .route(
            "/api/v1/sessions/:id/dataset",
            post(trends::handle_upload_dataset).delete(trends::handle_reset_dataset),
        )
        .route("/api/v1/sessions/:id/trends", get(trends::handle_get_trends))
        .route(
            "/api/v1/sessions/:id/selection/auto",
            post(trends::handle_auto_select),
        )
        // Ideas
        .route("/api/v1/sessions/:id/generate", post(ideation::handle_generate))
        .route("/api/v1/sessions/:id/export", get(ideation::handle_export))
        .with_state(state)
}
