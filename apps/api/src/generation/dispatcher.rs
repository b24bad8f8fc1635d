//! Generation Dispatcher: routes a prompt to the backend behind a model name.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::llm_client::{AnthropicClient, LlmError, OpenAiClient, Provider, TextGenerator};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown model '{0}'")]
    UnknownModel(String),

    #[error(transparent)]
    Backend(#[from] LlmError),
}

/// A selectable entry of the model catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ModelEntry {
    pub display_name: String,
    pub provider: Provider,
    pub model_id: String,
}

/// Maps display names to text-generation backends. The first entry is the
/// default selection.
#[derive(Clone)]
pub struct GenerationDispatcher {
    backends: Vec<(ModelEntry, Arc<dyn TextGenerator>)>,
}

impl GenerationDispatcher {
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// The catalog shipped with Scriptsmith.
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_backend(
                "Claude Sonnet 4",
                Arc::new(AnthropicClient::new(
                    config.anthropic_api_key.clone(),
                    "claude-sonnet-4-20250514",
                )),
            )
            .with_backend(
                "GPT-5",
                Arc::new(OpenAiClient::new(config.openai_api_key.clone(), "gpt-5")),
            )
    }

    pub fn with_backend(mut self, display_name: &str, backend: Arc<dyn TextGenerator>) -> Self {
        let entry = ModelEntry {
            display_name: display_name.to_string(),
            provider: backend.provider(),
            model_id: backend.model().to_string(),
        };
        self.backends.retain(|(e, _)| e.display_name != display_name);
        self.backends.push((entry, backend));
        self
    }

    pub fn catalog(&self) -> Vec<ModelEntry> {
        self.backends.iter().map(|(e, _)| e.clone()).collect()
    }

    pub fn default_model(&self) -> Option<&str> {
        self.backends.first().map(|(e, _)| e.display_name.as_str())
    }

    /// Sends `prompt` to the backend registered under `display_name`.
    pub async fn dispatch(&self, display_name: &str, prompt: &str) -> Result<String, DispatchError> {
        let (entry, backend) = self
            .backends
            .iter()
            .find(|(e, _)| e.display_name == display_name)
            .ok_or_else(|| DispatchError::UnknownModel(display_name.to_string()))?;

        info!(
            "Dispatching {} char prompt to {:?}/{}",
            prompt.chars().count(),
            entry.provider,
            entry.model_id
        );

        backend.complete(prompt).await.map_err(|e| {
            if e.is_auth_failure() {
                warn!("{} rejected the configured API key", entry.model_id);
            } else if e.is_rate_limited() {
                warn!("{} is rate limiting requests", entry.model_id);
            }
            DispatchError::from(e)
        })
    }
}

impl Default for GenerationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
