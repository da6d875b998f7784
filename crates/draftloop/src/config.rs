//! Project configuration file support for draftloop.
//!
//! Loads configuration from `draftloop.toml` in the working directory, or
//! from an explicit path given with `--config`.

use anyhow::{Context, Result};
use draftloop_llm::BackendType;
use serde::Deserialize;
use std::path::Path;

/// Project-level configuration loaded from `draftloop.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Backend used by both steps (groq, openai, ollama)
    pub backend: Option<String>,
    /// Global default model (applies to both writer and critic)
    pub model: Option<String>,
    /// Override for the backend's API base URL
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Cap on tokens generated per completion
    pub max_tokens: Option<u32>,
    /// Writer-specific configuration
    #[serde(default)]
    pub writer: RoleConfig,
    /// Critic-specific configuration
    #[serde(default)]
    pub critic: RoleConfig,
}

/// Configuration for a specific step (writer or critic)
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RoleConfig {
    /// Model to use for this step
    pub model: Option<String>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "draftloop.toml";

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        Self::load_from(&config_path).map(Some)
    }

    /// Load configuration from an explicit path. A missing file is an error.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(config)
    }

    /// Parsed backend, if one is configured
    pub fn backend_type(&self) -> Result<Option<BackendType>> {
        self.backend
            .as_deref()
            .map(|b| b.parse::<BackendType>().map_err(anyhow::Error::msg))
            .transpose()
    }

    /// Get the effective model for the writer step.
    /// Priority: [writer].model > global model > None
    pub fn writer_model(&self) -> Option<&str> {
        self.writer.model.as_deref().or(self.model.as_deref())
    }

    /// Get the effective model for the critic step.
    /// Priority: [critic].model > global model > None
    pub fn critic_model(&self) -> Option<&str> {
        self.critic.model.as_deref().or(self.model.as_deref())
    }
}
