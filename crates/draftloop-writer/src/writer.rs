use draftloop_llm::{BackendError, ChatBackend, Completion, Message};
use tracing::{debug, info};

use crate::WriterPrompts;

/// Drafts or revises the post from the full conversation history
pub struct WriterStep<'a> {
    backend: &'a dyn ChatBackend,
}

impl<'a> WriterStep<'a> {
    pub fn new(backend: &'a dyn ChatBackend) -> Self {
        Self { backend }
    }

    /// Messages sent to the backend: the persona followed by every turn so far
    pub fn build_request(history: &[Message]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(WriterPrompts::system_prompt()));
        messages.extend_from_slice(history);
        messages
    }

    /// Request one draft. The completion text is returned untouched; callers
    /// append it as the next assistant turn.
    pub async fn draft(&self, history: &[Message]) -> Result<Completion, BackendError> {
        let request = Self::build_request(history);

        debug!(
            backend = self.backend.name(),
            history_len = history.len(),
            "Running writer"
        );

        let completion = self.backend.complete(&request).await?;

        info!(
            words = completion.word_count(),
            duration_secs = completion.duration.as_secs_f64(),
            "Writer completed"
        );

        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftloop_llm::{Role, ScriptedBackend};

    #[tokio::test]
    async fn test_sends_persona_then_full_history() {
        let backend = ScriptedBackend::new().with_reply("Draft two");
        let writer = WriterStep::new(&backend);
        let history = vec![
            Message::user("Write a post about learning Git as a beginner."),
            Message::assistant("Draft one"),
            Message::user("Revise now. Apply ALL changes below. Output only the revised post text.\n- Shorter hook"),
        ];

        let completion = writer.draft(&history).await.unwrap();
        assert_eq!(completion.content, "Draft two");

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        let sent = &requests[0];
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[0].role(), Role::System);
        assert_eq!(sent[0].content(), WriterPrompts::system_prompt());
        assert_eq!(&sent[1..], history.as_slice());
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let backend = ScriptedBackend::new().with_failure(401, "invalid api key");
        let writer = WriterStep::new(&backend);

        let err = writer
            .draft(&[Message::user("topic")])
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_output_not_trimmed_or_validated() {
        let raw = "\n🚀🚀🚀 way too many emojis and words\n";
        let backend = ScriptedBackend::new().with_reply(raw);
        let writer = WriterStep::new(&backend);

        let completion = writer.draft(&[Message::user("topic")]).await.unwrap();
        assert_eq!(completion.content, raw);
    }
}
