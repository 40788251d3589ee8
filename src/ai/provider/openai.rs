//! OpenAI-Compatible Chat Backend
//!
//! Covers both the OpenAI API and DeepSeek, which speaks the same Chat
//! Completions wire format at a different base URL.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::CompletionProvider;
use crate::config::LlmConfig;
use crate::types::{CopycatError, Result};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const OPENAI_MODEL: &str = "gpt-4o";
const DEEPSEEK_API_BASE: &str = "https://api.deepseek.com/v1";
const DEEPSEEK_MODEL: &str = "deepseek-reasoner";

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Chat Completions backend with secure API key handling
pub struct OpenAiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    name: &'static str,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("name", &self.name)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn openai(config: &LlmConfig) -> Result<Self> {
        Self::with_defaults(config, "openai", OPENAI_API_BASE, OPENAI_MODEL, "OPENAI_API_KEY")
    }

    pub fn deepseek(config: &LlmConfig) -> Result<Self> {
        Self::with_defaults(
            config,
            "deepseek",
            DEEPSEEK_API_BASE,
            DEEPSEEK_MODEL,
            "DEEPSEEK_API_KEY",
        )
    }

    fn with_defaults(
        config: &LlmConfig,
        name: &'static str,
        default_base: &str,
        default_model: &str,
        key_var: &str,
    ) -> Result<Self> {
        let api_key_str = config.api_key.clone().ok_or_else(|| {
            CopycatError::Config(format!(
                "{} API key not found. Set {} or llm.api_key in config",
                name, key_var
            ))
        })?;

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| default_base.to_string());

        let model = config
            .model
            .clone()
            .unwrap_or_else(|| default_model.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CopycatError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            name,
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            stream: false,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = self.build_request(prompt);
        let url = format!("{}/chat/completions", self.api_base);

        debug!(backend = self.name, model = %self.model, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CopycatError::transport(format!("{} request failed: {}", self.name, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CopycatError::from_http_status(
                status.as_u16(),
                format!("{} API error ({}): {}", self.name, status, body),
            ));
        }

        let response_body: ChatCompletionResponse = response.json().await.map_err(|e| {
            CopycatError::transport(format!("Failed to parse {} response: {}", self.name, e))
        })?;

        let content = response_body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(content)
    }

    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> LlmConfig {
        LlmConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_deepseek_defaults() {
        let provider = OpenAiProvider::deepseek(&config_with_key()).unwrap();
        assert_eq!(provider.api_base, DEEPSEEK_API_BASE);
        assert_eq!(provider.model(), DEEPSEEK_MODEL);
        assert_eq!(provider.name(), "deepseek");
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let config = LlmConfig::default();
        let err = OpenAiProvider::openai(&config).unwrap_err();
        assert!(matches!(err, CopycatError::Config(_)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = OpenAiProvider::openai(&config_with_key()).unwrap();
        let repr = format!("{:?}", provider);
        assert!(repr.contains("[REDACTED]"));
        assert!(!repr.contains("sk-test"));
    }
}
