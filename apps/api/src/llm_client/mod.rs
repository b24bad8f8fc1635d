//! LLM Client: the text-generation backends Scriptsmith can dispatch to.
//!
//! Every backend implements `TextGenerator`: one single-turn prompt in, the
//! completion text out. No retries and no client-side timeout; a failed call
//! is reported once and the user re-triggers the action.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LlmError::Api { status: 429, .. })
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, LlmError::Api { status: 401 | 403, .. })
    }
}

/// The provider family a model belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Anthropic,
    OpenAi,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn provider(&self) -> Provider;

    fn model(&self) -> &str;

    /// Completes a single user-turn prompt.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Pulls a readable message out of an error body, falling back to the raw text.
pub(crate) fn api_error_message(body: String) -> String {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorBody,
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}
