use serde::Serialize;
use std::time::Duration;

use crate::ConversationState;

/// The finished result of a run
#[derive(Debug, Serialize)]
pub struct RunOutcome {
    /// Text of the last draft
    pub post: String,
    pub revisions: u32,
    pub writer_calls: usize,
    pub critique_calls: usize,
    /// Length of the conversation when the run stopped
    pub messages: usize,
    pub total_duration_secs: f64,
    #[serde(skip)]
    pub state: ConversationState,
}

impl RunOutcome {
    pub fn new(
        post: String,
        state: ConversationState,
        writer_calls: usize,
        critique_calls: usize,
        duration: Duration,
    ) -> Self {
        Self {
            post,
            revisions: state.revisions(),
            writer_calls,
            critique_calls,
            messages: state.len(),
            total_duration_secs: duration.as_secs_f64(),
            state,
        }
    }

    pub fn word_count(&self) -> usize {
        self.post.split_whitespace().count()
    }
}
