//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/copycat/config.toml)
//! 3. Project config (.copycat/config.toml)
//! 4. Environment variables (COPYCAT_* prefix, plus the credential
//!    variables the store and backends have always used)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{CopycatError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // e.g. COPYCAT_LLM_PROVIDER -> llm.provider
        figment = figment.merge(Env::prefixed("COPYCAT_").split("_").lowercase(true));

        let mut config: Config = figment
            .extract()
            .map_err(|e| CopycatError::Config(format!("Configuration error: {}", e)))?;

        Self::apply_credential_env(&mut config);

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| CopycatError::Config(format!("Configuration error: {}", e)))
    }

    /// Fill unset credentials from the environment variables the store and
    /// backends have always been keyed by. Config file values win.
    pub(crate) fn apply_credential_env(config: &mut Config) {
        if config.store.api_key.is_none() {
            config.store.api_key = env::var("AIRTABLE_API_KEY").ok().filter(|v| !v.is_empty());
        }
        if config.store.base_id.is_empty()
            && let Ok(base_id) = env::var("BASE_ID")
        {
            config.store.base_id = base_id;
        }

        if config.llm.api_key.is_none() {
            let var = match config.llm.provider.as_str() {
                "deepseek" => "DEEPSEEK_API_KEY",
                "openai" => "OPENAI_API_KEY",
                "anthropic" => "ANTHROPIC_API_KEY",
                _ => return,
            };
            config.llm.api_key = env::var(var).ok().filter(|v| !v.is_empty());
        }
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/copycat/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("copycat"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".copycat/config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".copycat")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config)
                    .map_err(|e| CopycatError::Config(e.to_string()))?
            );
        }

        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize project configuration
    pub fn init_project(force: bool) -> Result<PathBuf> {
        let project_dir = Self::project_dir();
        fs::create_dir_all(&project_dir)?;

        let config_path = project_dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_project_config())?;
            info!("Created project config: {}", config_path.display());
        } else {
            info!("Project config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Generate default project config content (TOML)
    fn default_project_config() -> String {
        r#"# copycat Project Configuration
# Credentials may also come from AIRTABLE_API_KEY / BASE_ID and the
# backend key variables (DEEPSEEK_API_KEY, OPENAI_API_KEY, ANTHROPIC_API_KEY).

version = "1.0"

[store]
base_id = ""
questions_table = "tbllwZpPeh9yHJ3fM"
clones_table = "tblpE46FDmB0LmeTU"

[llm]
provider = "deepseek"
model = "deepseek-reasoner"
timeout_secs = 30

[pipeline]
max_attempts = 5
record_delay_ms = 1000
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "version = \"1.0\"\n").unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.provider, "deepseek");
    }

    #[test]
    fn test_load_from_file_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[llm]\nprovider = \"ollama\"\nmodel = \"gemma3\"\n\n[pipeline]\nmax_attempts = 3\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model.as_deref(), Some("gemma3"));
        assert_eq!(config.pipeline.max_attempts, 3);
    }
}
