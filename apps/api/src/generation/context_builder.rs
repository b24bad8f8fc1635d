//! Context Builder: turns retrieved examples into the "inspiration" block.
//!
//! Queries the style and/or creator collections with the opening of the draft,
//! truncates each hit, and labels it. Never fails on an empty store: with no
//! hits the block degrades to `NO_EXAMPLES_SENTINEL`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{Collection, ExampleStore, MetadataFilter, StoreError};

pub const NO_EXAMPLES_SENTINEL: &str = "No relevant examples found.";

const STYLE_HEADER: &str = "Your personal writing style examples:";
const CREATOR_HEADER: &str = "\nSuccessful creator examples for inspiration:";
const ELLIPSIS: &str = "...";

/// Which collections inspire the rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    SelfOnly,
    CreatorsOnly,
    Both,
}

impl SourceMode {
    pub fn includes_self(&self) -> bool {
        matches!(self, SourceMode::SelfOnly | SourceMode::Both)
    }

    pub fn includes_creators(&self) -> bool {
        matches!(self, SourceMode::CreatorsOnly | SourceMode::Both)
    }
}

/// How much retrieved material goes into one prompt.
#[derive(Debug, Clone)]
pub struct ContextBudget {
    /// Characters of the script used as the similarity probe.
    pub probe_chars: usize,
    pub style_results: usize,
    pub creator_results: usize,
    /// Characters kept from each retrieved example.
    pub excerpt_chars: usize,
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            probe_chars: 500,
            style_results: 2,
            creator_results: 3,
            excerpt_chars: 400,
        }
    }
}

/// Assembles the labelled context block for `script`.
///
/// An empty `creator_names` means "all creators"; otherwise creator hits are
/// restricted to those names.
pub async fn build_context(
    store: &ExampleStore,
    script: &str,
    mode: SourceMode,
    creator_names: &[String],
    budget: &ContextBudget,
) -> Result<String, StoreError> {
    let probe = take_chars(script, budget.probe_chars);
    let mut parts: Vec<String> = Vec::new();

    if mode.includes_self() {
        let hits = store
            .query(Collection::MyStyle, probe, budget.style_results, None)
            .await?;
        if !hits.is_empty() {
            parts.push(STYLE_HEADER.to_string());
            for (i, hit) in hits.iter().enumerate() {
                parts.push(format!(
                    "Your Style Example {} - '{}':\n{}{ELLIPSIS}",
                    i + 1,
                    hit.example.field("title"),
                    take_chars(&hit.example.document, budget.excerpt_chars),
                ));
            }
        }
    }

    if mode.includes_creators() {
        let filter = (!creator_names.is_empty())
            .then(|| MetadataFilter::new("creator_name", creator_names.to_vec()));
        let hits = store
            .query(
                Collection::FavoriteCreators,
                probe,
                budget.creator_results,
                filter.as_ref(),
            )
            .await?;
        if !hits.is_empty() {
            parts.push(CREATOR_HEADER.to_string());
            for (i, hit) in hits.iter().enumerate() {
                parts.push(format!(
                    "Creator Example {} - {}: '{}':\n{}{ELLIPSIS}",
                    i + 1,
                    hit.example.field("creator_name"),
                    hit.example.field("content_title"),
                    take_chars(&hit.example.document, budget.excerpt_chars),
                ));
            }
        }
    }

    debug!("Built context from {} parts ({:?})", parts.len(), mode);

    if parts.is_empty() {
        Ok(NO_EXAMPLES_SENTINEL.to_string())
    } else {
        Ok(parts.join("\n\n"))
    }
}

/// The first `n` characters of `text`, never splitting a character.
pub fn take_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
