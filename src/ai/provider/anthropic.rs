//! Anthropic Messages Backend

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::CompletionProvider;
use crate::config::LlmConfig;
use crate::types::{CopycatError, Result};

const DEFAULT_API_BASE: &str = "https://api.anthropic.com/v1";
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
const API_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Anthropic Messages API backend with secure key handling
pub struct AnthropicProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key_str = config.api_key.clone().ok_or_else(|| {
            CopycatError::Config(
                "Anthropic API key not found. Set ANTHROPIC_API_KEY or llm.api_key in config"
                    .to_string(),
            )
        })?;

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let model = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CopycatError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };
        let url = format!("{}/messages", self.api_base);

        debug!(model = %self.model, "Sending request to Anthropic");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CopycatError::transport(format!("Anthropic request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CopycatError::from_http_status(
                status.as_u16(),
                format!("Anthropic API error ({}): {}", status, body),
            ));
        }

        let response_body: MessagesResponse = response.json().await.map_err(|e| {
            CopycatError::transport(format!("Failed to parse Anthropic response: {}", e))
        })?;

        let text = response_body
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(text)
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: usize,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_config_error() {
        let config = LlmConfig {
            provider: "anthropic".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            AnthropicProvider::new(&config).unwrap_err(),
            CopycatError::Config(_)
        ));
    }

    #[test]
    fn test_default_model() {
        let config = LlmConfig {
            provider: "anthropic".to_string(),
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let provider = AnthropicProvider::new(&config).unwrap();
        assert_eq!(provider.model(), DEFAULT_MODEL);
    }
}
