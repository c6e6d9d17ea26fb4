//! Default LLM configs loaded from environment variables.
//!
//! Convenience constructors for [`LlmModelConfig`], grouped by provider.
//! Currently only **Groq** is supported.
//!
//! # Environment variables
//!
//! - `GROQ_URL`          = endpoint base (optional, defaults to the public API)
//! - `GROQ_API_KEY`      = API key (required unless passed explicitly)
//! - `LLM_MAX_TOKENS`    = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS`  = optional request timeout (u64, default 60)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError, env_opt_u32, env_opt_u64},
};

/// Fixed fallback model id used when a requested model has been
/// decommissioned or never existed.
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Public Groq endpoint base (OpenAI-compatible paths hang off `/v1`).
pub const DEFAULT_GROQ_ENDPOINT: &str = "https://api.groq.com/openai";

/// Constructs a Groq config for insight generation.
///
/// `api_key` precedence: the explicit argument (per-request key from the
/// HTTP body) wins over `GROQ_API_KEY`.
///
/// # Defaults
/// - `temperature = Some(0.2)` (low, for stable evaluation output)
/// - `timeout_secs = Some(60)`
///
/// # Errors
/// - [`ConfigError::EmptyModel`] when `model` is blank
/// - [`ConfigError::MissingVar`] when no API key is available
pub fn config_groq(model: &str, api_key: Option<String>) -> Result<LlmModelConfig, AiLlmError> {
    if model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }

    let endpoint = std::env::var("GROQ_URL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_GROQ_ENDPOINT.to_string());

    let api_key = api_key
        .filter(|s| !s.trim().is_empty())
        .or_else(|| std::env::var("GROQ_API_KEY").ok().filter(|s| !s.trim().is_empty()))
        .ok_or(ConfigError::MissingVar("GROQ_API_KEY"))?;

    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;
    let timeout_secs = env_opt_u64("LLM_TIMEOUT_SECS")?.or(Some(60));

    Ok(LlmModelConfig {
        provider: LlmProvider::Groq,
        model: model.to_string(),
        endpoint,
        api_key: Some(api_key),
        max_tokens,
        temperature: Some(0.2),
        top_p: None,
        timeout_secs,
    })
}
