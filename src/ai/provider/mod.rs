//! LLM Backend Abstraction
//!
//! Defines the CompletionProvider trait: one free-text completion operation
//! per backend. Backend identity only changes endpoint, auth, and model
//! name; the pipeline is written once against this shape.

mod anthropic;
mod ollama;
mod openai;

pub use anthropic::AnthropicProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::types::{CopycatError, Result};

/// Shared backend handle
pub type SharedProvider = Arc<dyn CompletionProvider>;

/// A generative text backend.
///
/// `complete` issues exactly one request; retry policy lives in the gateway,
/// not here. Implementations map HTTP status codes through
/// `CopycatError::from_http_status` so the gateway can distinguish permanent
/// misconfiguration from transient overload.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send a prompt, return the raw response text.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Backend name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}

/// Create a shared backend from configuration
pub fn create_provider(config: &LlmConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "deepseek" => Ok(Arc::new(OpenAiProvider::deepseek(config)?)),
        "openai" => Ok(Arc::new(OpenAiProvider::openai(config)?)),
        "anthropic" => Ok(Arc::new(AnthropicProvider::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config)?)),
        _ => Err(CopycatError::Config(format!(
            "Unknown provider: {}. Supported: deepseek, openai, anthropic, ollama",
            config.provider
        ))),
    }
}
