//! Test double that replays canned completions.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::{BackendError, ChatBackend, Completion, Message};

type Responder = Box<dyn Fn(&[Message]) -> String + Send + Sync>;

enum Reply {
    Text(String),
    Failure { status: u16, body: String },
}

/// Backend that answers from a queue of scripted replies, falling back to a
/// responder function once the queue is drained. Every request is recorded.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    responder: Option<Responder>,
    requests: Mutex<Vec<Vec<Message>>>,
    model: String,
    finish_reason: String,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            responder: None,
            requests: Mutex::new(Vec::new()),
            model: "scripted".to_string(),
            finish_reason: "stop".to_string(),
        }
    }

    /// Answer every request by calling `f` with the request messages
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&[Message]) -> String + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(f)),
            ..Self::new()
        }
    }

    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.push(Reply::Text(text.into()));
        self
    }

    pub fn with_replies<I, S>(self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for text in texts {
            self.push(Reply::Text(text.into()));
        }
        self
    }

    /// Report `reason` as the finish reason of every completion
    pub fn with_finish_reason(mut self, reason: impl Into<String>) -> Self {
        self.finish_reason = reason.into();
        self
    }

    /// Queue an HTTP-style failure
    pub fn with_failure(self, status: u16, body: impl Into<String>) -> Self {
        self.push(Reply::Failure {
            status,
            body: body.into(),
        });
        self
    }

    /// All requests received so far, in order
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn push(&self, reply: Reply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[Message]) -> Result<Completion, BackendError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.to_vec());
        }

        let next = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        let text = match next {
            Some(Reply::Text(text)) => text,
            Some(Reply::Failure { status, body }) => {
                return Err(BackendError::Status { status, body })
            }
            None => match self.responder {
                Some(ref f) => f(messages),
                None => return Err(BackendError::EmptyResponse),
            },
        };

        Ok(Completion::new(text, self.model.clone(), Duration::ZERO)
            .with_finish_reason(self.finish_reason.clone()))
    }
}
