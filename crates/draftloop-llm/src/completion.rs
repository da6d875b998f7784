use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single completion returned by a backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// Raw text of the completion
    pub content: String,
    /// Model that produced it, as reported by the backend
    pub model: String,
    /// Why generation stopped, if reported
    pub finish_reason: Option<String>,
    /// Round-trip time of the request
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl Completion {
    pub fn new(content: String, model: String, duration: Duration) -> Self {
        Self {
            content,
            model,
            finish_reason: None,
            duration,
        }
    }

    pub fn with_finish_reason(mut self, reason: impl Into<String>) -> Self {
        self.finish_reason = Some(reason.into());
        self
    }

    /// Whether generation stopped because of the token limit
    pub fn truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some("length")
    }

    /// Count whitespace-separated words in the content
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs))
    }
}
