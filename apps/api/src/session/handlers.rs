use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::errors::AppError;
use crate::state::AppState;

pub const DOWNLOAD_FILENAME: &str = "enhanced_script.txt";

/// GET /api/v1/sessions/:session_id/script
///
/// The latest improved script as a plain-text download.
pub async fn handle_download_script(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let script = state
        .sessions
        .latest_result(&session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No enhanced script for session {session_id}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
            ),
        ],
        script,
    ))
}

/// DELETE /api/v1/sessions/:session_id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.sessions.clear(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
