use crate::error_handler::{AiLlmError, ConfigError};

/// Represents the provider (backend) used for large language model inference.
///
/// The insights backend currently speaks to Groq's OpenAI-compatible API
/// only; additional providers can be added by extending this enum and the
/// matching service module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Groq cloud (OpenAI-compatible chat completions).
    Groq,
}

impl LlmProvider {
    /// Parses a provider name as it appears in request bodies and env vars.
    ///
    /// # Errors
    /// [`ConfigError::UnsupportedProvider`] for anything other than `groq`.
    pub fn parse(name: &str) -> Result<Self, AiLlmError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(LlmProvider::Groq),
            other => Err(ConfigError::UnsupportedProvider(other.to_string()).into()),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "groq",
        }
    }
}
