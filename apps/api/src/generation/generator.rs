//! Script improvement: the full retrieval-and-generation workflow.
//!
//! Flow: build_context → build_improvement_prompt → dispatch → return.
//! Nothing is persisted here; the caller decides what to do with a success.

use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::generation::context_builder::{build_context, ContextBudget, SourceMode};
use crate::generation::dispatcher::{DispatchError, GenerationDispatcher};
use crate::generation::prompts::{build_improvement_prompt, ImprovementFocus};
use crate::store::ExampleStore;

/// Request body for a script improvement run.
#[derive(Debug, Clone, Deserialize)]
pub struct ImproveRequest {
    pub script: String,
    pub mode: SourceMode,
    /// Creator names to draw from; empty means every creator.
    #[serde(default)]
    pub creators: Vec<String>,
    #[serde(default)]
    pub focus: ImprovementFocus,
    /// Display name from the model catalog; defaults to the first entry.
    pub model: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImprovedScript {
    pub model: String,
    pub text: String,
}

/// Runs one improvement. Store and backend failures come back as a
/// user-facing `AppError::Generation`.
pub async fn improve_script(
    store: &ExampleStore,
    dispatcher: &GenerationDispatcher,
    request: &ImproveRequest,
    budget: &ContextBudget,
) -> Result<ImprovedScript, AppError> {
    if request.script.trim().is_empty() {
        return Err(AppError::Validation("script cannot be empty".to_string()));
    }

    let model = match request.model.as_deref() {
        Some(name) => name.to_string(),
        None => dispatcher
            .default_model()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("No generation models configured")))?
            .to_string(),
    };

    info!(
        "Improving script ({} chars) with {:?} sources, focus '{}', model '{}'",
        request.script.chars().count(),
        request.mode,
        request.focus.label(),
        model
    );

    let context = build_context(
        store,
        &request.script,
        request.mode,
        &request.creators,
        budget,
    )
    .await
    .map_err(|e| AppError::Generation(format!("Error improving script: {e}")))?;

    let prompt = build_improvement_prompt(&request.script, request.focus.label(), &context);

    let text = dispatcher
        .dispatch(&model, &prompt)
        .await
        .map_err(|e| match e {
            DispatchError::UnknownModel(_) => AppError::Validation(e.to_string()),
            DispatchError::Backend(_) => {
                AppError::Generation(format!("Error improving script: {e}"))
            }
        })?;

    Ok(ImprovedScript { model, text })
}
