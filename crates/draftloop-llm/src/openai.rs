// OpenAI-compatible chat completion client
//
// Groq, OpenAI and Ollama all accept the same `/chat/completions` request
// shape, so one client covers every supported backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::{BackendConfig, BackendError, BackendType, ChatBackend, Completion, Message};

/// Chat completion client for OpenAI-compatible APIs
#[derive(Clone)]
pub struct OpenAiCompatibleBackend {
    client: Client,
    backend_type: BackendType,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAiCompatibleBackend {
    /// Create a client, resolving defaults from the backend type.
    ///
    /// The API key comes from `config.api_key` or, failing that, from the
    /// backend's environment variable. Missing keys are an error for
    /// backends that require one.
    pub fn new(backend_type: BackendType, config: BackendConfig) -> Result<Self, BackendError> {
        let api_key = match (config.api_key, backend_type.api_key_env()) {
            (Some(key), _) => Some(key),
            (None, Some(var)) => Some(
                std::env::var(var)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| BackendError::MissingApiKey(var.to_string()))?,
            ),
            (None, None) => None,
        };

        if !(0.0..=2.0).contains(&config.temperature) {
            return Err(BackendError::Config(format!(
                "temperature must be between 0 and 2, got {}",
                config.temperature
            )));
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| backend_type.default_base_url().to_string());

        Ok(Self {
            client,
            backend_type,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config
                .model
                .unwrap_or_else(|| backend_type.default_model().to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for OpenAiCompatibleBackend {
    fn name(&self) -> &str {
        match self.backend_type {
            BackendType::Groq => "groq",
            BackendType::OpenAi => "openai",
            BackendType::Ollama => "ollama",
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[Message]) -> Result<Completion, BackendError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(
            backend = self.name(),
            model = %self.model,
            messages = messages.len(),
            "Sending chat completion request"
        );

        let start = Instant::now();
        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: api_error_message(&body),
            });
        }

        let chat: ChatResponse = response.json().await?;
        let duration = start.elapsed();

        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or(BackendError::EmptyResponse)?;

        debug!(
            duration_ms = duration.as_millis(),
            finish_reason = ?choice.finish_reason,
            "Chat completion received"
        );

        let mut completion = Completion::new(
            choice.message.content.unwrap_or_default(),
            chat.model.unwrap_or_else(|| self.model.clone()),
            duration,
        );
        if let Some(reason) = choice.finish_reason {
            completion = completion.with_finish_reason(reason);
        }
        Ok(completion)
    }
}

/// Pull the human-readable message out of an OpenAI-style error body
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
