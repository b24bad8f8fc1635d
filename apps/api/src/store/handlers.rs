use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::models::example::{
    CreatorExample, CreatorGroup, CreatorSummary, NewCreatorExample, NewStyleExample,
    StyleExample,
};
use crate::state::AppState;
use crate::store::{AddOutcome, Collection};

fn rejection(missing_fields: &[&str]) -> AppError {
    AppError::UnprocessableEntity(format!(
        "Nothing saved. Required fields are empty: {}",
        missing_fields.join(", ")
    ))
}

/// POST /api/v1/examples/style
pub async fn handle_save_style(
    State(state): State<AppState>,
    Json(req): Json<NewStyleExample>,
) -> Result<(StatusCode, Json<StyleExample>), AppError> {
    match state.store.save_style_example(&req).await? {
        AddOutcome::Added(example) => Ok((StatusCode::CREATED, Json(example.into()))),
        AddOutcome::Rejected { missing_fields } => Err(rejection(&missing_fields)),
    }
}

/// GET /api/v1/examples/style
pub async fn handle_list_style(
    State(state): State<AppState>,
) -> Result<Json<Vec<StyleExample>>, AppError> {
    let examples = state.store.list_all(Collection::MyStyle).await?;
    Ok(Json(examples.into_iter().map(StyleExample::from).collect()))
}

/// GET /api/v1/examples/style/:id
pub async fn handle_get_style(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StyleExample>, AppError> {
    let example = state
        .store
        .get(Collection::MyStyle, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Style example {id} not found")))?;
    Ok(Json(example.into()))
}

/// DELETE /api/v1/examples/style/:id
pub async fn handle_delete_style(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete(Collection::MyStyle, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/examples/creators
pub async fn handle_save_creator(
    State(state): State<AppState>,
    Json(req): Json<NewCreatorExample>,
) -> Result<(StatusCode, Json<CreatorExample>), AppError> {
    match state.store.save_creator_example(&req).await? {
        AddOutcome::Added(example) => Ok((StatusCode::CREATED, Json(example.into()))),
        AddOutcome::Rejected { missing_fields } => Err(rejection(&missing_fields)),
    }
}

/// GET /api/v1/examples/creators
pub async fn handle_list_creators(
    State(state): State<AppState>,
) -> Result<Json<Vec<CreatorExample>>, AppError> {
    let examples = state.store.list_all(Collection::FavoriteCreators).await?;
    Ok(Json(examples.into_iter().map(CreatorExample::from).collect()))
}

/// GET /api/v1/examples/creators/grouped
pub async fn handle_list_creators_grouped(
    State(state): State<AppState>,
) -> Result<Json<Vec<CreatorGroup>>, AppError> {
    Ok(Json(state.store.list_grouped_by_creator().await?))
}

/// GET /api/v1/examples/creators/names
pub async fn handle_creator_names(
    State(state): State<AppState>,
) -> Result<Json<Vec<CreatorSummary>>, AppError> {
    Ok(Json(state.store.creator_summaries().await?))
}

/// GET /api/v1/examples/creators/:id
pub async fn handle_get_creator(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CreatorExample>, AppError> {
    let example = state
        .store
        .get(Collection::FavoriteCreators, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Creator example {id} not found")))?;
    Ok(Json(example.into()))
}

/// DELETE /api/v1/examples/creators/:id
pub async fn handle_delete_creator(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete(Collection::FavoriteCreators, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
