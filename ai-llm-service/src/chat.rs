use serde::Serialize;

/// A single chat message in an OpenAI-compatible conversation.
///
/// Owned content so prompts can be built incrementally and shipped across
/// await points without borrow gymnastics.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// One of: "system" | "user" | "assistant".
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}
