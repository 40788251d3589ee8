//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/copycat/) and project (.copycat/) level
//! configuration. Credentials are never serialized back out.

use serde::{Deserialize, Serialize};

use crate::constants::{gateway, network, pipeline};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Record store settings
    pub store: StoreConfig,

    /// LLM backend settings
    pub llm: LlmConfig,

    /// Pipeline tuning
    pub pipeline: PipelineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            store: StoreConfig::default(),
            llm: LlmConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `CopycatError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(crate::types::CopycatError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(crate::types::CopycatError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.max_attempts == 0 {
            return Err(crate::types::CopycatError::Config(
                "pipeline max_attempts must be at least 1".to_string(),
            ));
        }

        let alphabet = &self.pipeline.answer_alphabet;
        if alphabet.is_empty() || !alphabet.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(crate::types::CopycatError::Config(format!(
                "answer_alphabet must be non-empty uppercase letters, got {:?}",
                alphabet
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Record Store Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store API key. Never serialized to output.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Base (workspace) identifier
    pub base_id: String,

    /// Table holding the source questions
    pub questions_table: String,

    /// Table receiving generated clones
    pub clones_table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_id: String::new(),
            questions_table: "tbllwZpPeh9yHJ3fM".to_string(),
            clones_table: "tblpE46FDmB0LmeTU".to_string(),
        }
    }
}

impl StoreConfig {
    /// Pre-flight check that the store is addressable at all.
    pub fn require(&self) -> crate::types::Result<()> {
        if self.api_key.as_deref().unwrap_or("").is_empty() {
            return Err(crate::types::CopycatError::Config(
                "store API key not set. Set AIRTABLE_API_KEY or store.api_key in config"
                    .to_string(),
            ));
        }
        if self.base_id.is_empty() {
            return Err(crate::types::CopycatError::Config(
                "store base_id not set. Set BASE_ID or store.base_id in config".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// LLM Backend Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend type: "deepseek", "openai", "anthropic", "ollama"
    pub provider: String,

    /// Model name (backend-specific)
    pub model: Option<String>,

    /// API key. Never serialized to output.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,

    /// Per-attempt request timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: usize,

    /// Provenance label written with each clone (defaults to the model name)
    pub label: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "deepseek".to_string(),
            model: None,
            api_key: None,
            api_base: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.7,
            max_tokens: network::DEFAULT_MAX_TOKENS,
            label: None,
        }
    }
}

impl LlmConfig {
    /// Label stored in the clone record's model field.
    pub fn display_label(&self) -> String {
        self.label
            .clone()
            .or_else(|| self.model.clone())
            .unwrap_or_else(|| self.provider.clone())
    }
}

// =============================================================================
// Pipeline Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum generation attempts per record
    pub max_attempts: u32,

    /// Base backoff delay in milliseconds (doubled per attempt)
    pub base_delay_ms: u64,

    /// Delay between processed records in milliseconds
    pub record_delay_ms: u64,

    /// Closed answer alphabet
    pub answer_alphabet: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_attempts: gateway::DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: gateway::BASE_DELAY_MS,
            record_delay_ms: pipeline::RECORD_DELAY_MS,
            answer_alphabet: pipeline::ANSWER_ALPHABET.to_string(),
        }
    }
}
