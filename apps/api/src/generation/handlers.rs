//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::dispatcher::ModelEntry;
use crate::generation::generator::{improve_script, ImproveRequest};
use crate::generation::prompts::ImprovementFocus;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ImproveResponse {
    pub session_id: String,
    pub model: String,
    pub improved_script: String,
}

#[derive(Debug, Serialize)]
pub struct ModelCatalogResponse {
    pub default_model: Option<String>,
    pub models: Vec<ModelEntry>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/scripts/improve
///
/// Builds context, prompts the selected model, and on success replaces the
/// session's latest result. A failed generation leaves the previous result in
/// place. A failed slot write is logged and the completion is still returned.
pub async fn handle_improve(
    State(state): State<AppState>,
    Json(request): Json<ImproveRequest>,
) -> Result<Json<ImproveResponse>, AppError> {
    let session_id = request
        .session_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let improved = improve_script(&state.store, &state.dispatcher, &request, &state.budget).await?;

    match state.sessions.store_result(&session_id, &improved.text).await {
        Ok(()) => info!("Script improved for session {session_id}"),
        Err(e) => warn!("Script improved but session {session_id} was not updated: {e}"),
    }

    Ok(Json(ImproveResponse {
        session_id,
        model: improved.model,
        improved_script: improved.text,
    }))
}

/// GET /api/v1/models
pub async fn handle_list_models(State(state): State<AppState>) -> Json<ModelCatalogResponse> {
    Json(ModelCatalogResponse {
        default_model: state.dispatcher.default_model().map(str::to_string),
        models: state.dispatcher.catalog(),
    })
}

/// GET /api/v1/focus-areas
pub async fn handle_list_focus_areas() -> Json<Vec<&'static str>> {
    Json(ImprovementFocus::ALL.iter().map(|f| f.label()).collect())
}
