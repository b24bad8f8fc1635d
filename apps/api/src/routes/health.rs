use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;
use crate::store::Collection;

/// GET /health
/// Service version plus the backends this instance was started with.
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let mut collections = serde_json::Map::new();
    for collection in [Collection::MyStyle, Collection::FavoriteCreators] {
        let count = state.store.count(collection).await?;
        collections.insert(collection.name().to_string(), json!(count));
    }

    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "scriptsmith",
        "embedding": state.store.embedder_name(),
        "sessions": state.sessions.backend_name(),
        "session_ttl_secs": state.config.session_ttl_secs,
        "models": state.dispatcher.catalog().len(),
        "collections": collections
    })))
}
