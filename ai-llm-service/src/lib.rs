//! Shared LLM service for the insights backend.
//!
//! Exposes a single provider client ([`GroqService`], OpenAI-compatible chat
//! completions) plus the configuration and unified error types the rest of
//! the workspace consumes. Construct once per request scope and pass by
//! reference; the client keeps its own preconfigured `reqwest::Client`.

pub mod chat;
pub mod config;
pub mod error_handler;
pub mod services;

pub use chat::ChatMessage;
pub use config::default_config::{DEFAULT_GROQ_ENDPOINT, DEFAULT_GROQ_MODEL};
pub use error_handler::AiLlmError;
pub use services::groq_service::GroqService;
