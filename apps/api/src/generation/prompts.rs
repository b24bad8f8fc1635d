// Prompt text for the script improvement call.

use serde::{Deserialize, Serialize};

/// The aspect of the draft the rewrite should concentrate on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImprovementFocus {
    #[default]
    #[serde(rename = "Overall storytelling and flow")]
    StorytellingAndFlow,
    #[serde(rename = "Hook and opening strength")]
    HookAndOpening,
    #[serde(rename = "Call-to-action effectiveness")]
    CallToAction,
    #[serde(rename = "Clarity and structure")]
    ClarityAndStructure,
    #[serde(rename = "Emotional engagement")]
    EmotionalEngagement,
    #[serde(rename = "Match my personal voice")]
    PersonalVoice,
}

impl ImprovementFocus {
    pub const ALL: [ImprovementFocus; 6] = [
        ImprovementFocus::StorytellingAndFlow,
        ImprovementFocus::HookAndOpening,
        ImprovementFocus::CallToAction,
        ImprovementFocus::ClarityAndStructure,
        ImprovementFocus::EmotionalEngagement,
        ImprovementFocus::PersonalVoice,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ImprovementFocus::StorytellingAndFlow => "Overall storytelling and flow",
            ImprovementFocus::HookAndOpening => "Hook and opening strength",
            ImprovementFocus::CallToAction => "Call-to-action effectiveness",
            ImprovementFocus::ClarityAndStructure => "Clarity and structure",
            ImprovementFocus::EmotionalEngagement => "Emotional engagement",
            ImprovementFocus::PersonalVoice => "Match my personal voice",
        }
    }
}

/// Builds the single instruction prompt sent to the generation backend.
///
/// Pure: the same inputs always give byte-identical output. The script and
/// context are inserted as-is and never scanned for placeholders.
pub fn build_improvement_prompt(script: &str, focus: &str, context: &str) -> String {
    format!(
        r#"You are an expert script editor specializing in content creation and storytelling.

ORIGINAL SCRIPT TO IMPROVE:
"{script}"

FOCUS AREA: {focus}

INSPIRATION SOURCES:
{context}

Your task:
1. Rewrite and improve the original script, focusing specifically on {focus_lower}
2. Draw inspiration from the provided examples while maintaining the user's authentic voice
3. Enhance storytelling elements, structure, and engagement
4. Keep the core message but elevate the execution

Provide the improved script.

Make it compelling, authentic, and ready to use."#,
        focus_lower = focus.to_lowercase(),
    )
}
