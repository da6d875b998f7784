use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::{Completion, Message};

/// Errors that can occur while invoking a backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Missing API key: set the {0} environment variable")]
    MissingApiKey(String),

    #[error("Backend returned no completion choices")]
    EmptyResponse,

    #[error("Backend configuration error: {0}")]
    Config(String),
}

impl BackendError {
    /// Status code for errors that came back from the remote API
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            BackendError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Supported chat completion services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendType {
    #[default]
    Groq,
    OpenAi,
    Ollama,
}

impl BackendType {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            BackendType::Groq => "https://api.groq.com/openai/v1",
            BackendType::OpenAi => "https://api.openai.com/v1",
            BackendType::Ollama => "http://localhost:11434/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            BackendType::Groq => "openai/gpt-oss-120b",
            BackendType::OpenAi => "gpt-4o",
            BackendType::Ollama => "qwen3:8b",
        }
    }

    /// Environment variable holding the API key (None = no key required)
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            BackendType::Groq => Some("GROQ_API_KEY"),
            BackendType::OpenAi => Some("OPENAI_API_KEY"),
            BackendType::Ollama => None,
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::Groq => write!(f, "groq"),
            BackendType::OpenAi => write!(f, "openai"),
            BackendType::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "groq" => Ok(BackendType::Groq),
            "openai" | "open-ai" => Ok(BackendType::OpenAi),
            "ollama" => Ok(BackendType::Ollama),
            _ => Err(format!("Unknown backend: {}", s)),
        }
    }
}

/// Configuration for a backend client
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the OpenAI-compatible API (None = backend default)
    pub base_url: Option<String>,
    /// Model to request (None = backend default)
    pub model: Option<String>,
    /// API key (None = read from the backend's environment variable)
    pub api_key: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on generated tokens, if any
    pub max_tokens: Option<u32>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: None,
            api_key: None,
            temperature: 0.0,
            max_tokens: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl BackendConfig {
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A language-generation service: ordered messages in, one completion out
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Human-readable name of the backend (e.g., "groq")
    fn name(&self) -> &str;

    /// Model requested on every call
    fn model(&self) -> &str;

    /// Request a single completion for the given conversation
    async fn complete(&self, messages: &[Message]) -> Result<Completion, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_type_round_trips_through_display() {
        for ty in [BackendType::Groq, BackendType::OpenAi, BackendType::Ollama] {
            assert_eq!(ty.to_string().parse::<BackendType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!("anthropic".parse::<BackendType>().is_err());
    }

    #[test]
    fn test_default_config_is_deterministic() {
        let config = BackendConfig::default();
        assert_eq!(config.temperature, 0.0);
        assert!(config.model.is_none());
    }

    #[test]
    fn test_ollama_needs_no_key() {
        assert!(BackendType::Ollama.api_key_env().is_none());
        assert_eq!(BackendType::Groq.api_key_env(), Some("GROQ_API_KEY"));
    }
}
