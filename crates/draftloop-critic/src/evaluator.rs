use draftloop_llm::{latest_assistant, BackendError, ChatBackend, Completion, Message};
use tracing::{debug, info, warn};

use crate::{CriticPrompts, FixesList};

/// Result of one critique: the raw completion and its parsed fixes.
/// `completion.content` is the fixes list exactly as the backend wrote it.
#[derive(Debug, Clone)]
pub struct Critique {
    pub completion: Completion,
    pub fixes: FixesList,
}

/// Reviews the most recent draft and produces a fixes list
pub struct CritiqueStep<'a> {
    backend: &'a dyn ChatBackend,
}

impl<'a> CritiqueStep<'a> {
    pub fn new(backend: &'a dyn ChatBackend) -> Self {
        Self { backend }
    }

    /// Messages sent to the backend: the review prompt and the draft only
    pub fn build_request(draft: &Message) -> Vec<Message> {
        vec![
            Message::system(CriticPrompts::build_review_prompt()),
            draft.clone(),
        ]
    }

    /// Review the latest draft in `history`
    pub async fn review(&self, history: &[Message]) -> Result<Critique, CritiqueError> {
        let draft = latest_assistant(history).ok_or(CritiqueError::NoDraftToReview {
            history_len: history.len(),
        })?;
        let request = Self::build_request(draft);

        debug!(
            backend = self.backend.name(),
            draft_len = draft.content().len(),
            "Running critique"
        );

        let completion = self.backend.complete(&request).await?;
        let fixes = FixesList::parse(&completion.content);

        if !fixes.conforms {
            warn!("Critique did not open with the revise directive");
        }

        info!(
            bullets = fixes.len(),
            duration_secs = completion.duration.as_secs_f64(),
            "Critique completed"
        );

        Ok(Critique { completion, fixes })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CritiqueError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("No draft to review: none of the {history_len} messages is assistant-authored")]
    NoDraftToReview { history_len: usize },
}
