use draftloop_llm::{latest_assistant, Message};

/// Conversation threaded through one run.
///
/// Messages are append-only. `revisions` counts critiques and never goes
/// down; only [`ConversationState::append_fixes`] moves it.
#[derive(Debug, Clone)]
pub struct ConversationState {
    messages: Vec<Message>,
    revisions: u32,
}

impl ConversationState {
    /// Start a run from the user's brief
    pub fn new(brief: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(brief)],
            revisions: 0,
        }
    }

    /// Append a writer draft as an assistant turn
    pub fn append_draft(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Append a critique as a user turn and count the revision
    pub fn append_fixes(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
        self.revisions += 1;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn revisions(&self) -> u32 {
        self.revisions
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn latest_assistant(&self) -> Option<&Message> {
        latest_assistant(&self.messages)
    }

    /// Text of the most recent draft
    pub fn final_post(&self) -> Option<&str> {
        self.latest_assistant().map(Message::content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftloop_llm::Role;

    #[test]
    fn test_new_state_holds_brief_only() {
        let state = ConversationState::new("Write a post about learning Git as a beginner.");
        assert_eq!(state.len(), 1);
        assert_eq!(state.revisions(), 0);
        assert_eq!(state.messages()[0].role(), Role::User);
        assert!(state.final_post().is_none());
    }

    #[test]
    fn test_draft_does_not_count_revision() {
        let mut state = ConversationState::new("brief");
        state.append_draft("draft");
        assert_eq!(state.revisions(), 0);
        assert_eq!(state.messages()[1].role(), Role::Assistant);
        assert_eq!(state.final_post(), Some("draft"));
    }

    #[test]
    fn test_fixes_count_exactly_one_revision() {
        let mut state = ConversationState::new("brief");
        state.append_draft("draft 1");
        state.append_fixes("fixes 1");
        assert_eq!(state.len(), 3);
        assert_eq!(state.revisions(), 1);
        assert_eq!(state.messages()[2].role(), Role::User);
        // The fixes are a user turn, so the latest draft is unchanged
        assert_eq!(state.final_post(), Some("draft 1"));

        state.append_draft("draft 2");
        state.append_fixes("fixes 2");
        assert_eq!(state.revisions(), 2);
    }
}
