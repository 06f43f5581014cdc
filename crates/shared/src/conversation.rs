//! The in-memory transcript of one chat session.

use crate::agent_api::{ChatMessage, Role};

/// Ordered chat turns. Only the trailing assistant turn is ever mutated.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    /// Append an empty assistant turn that deltas will fill in.
    pub fn begin_assistant(&mut self) {
        self.messages.push(ChatMessage::assistant(String::new()));
    }

    /// Append `delta` to the trailing assistant turn. Returns `false` when the
    /// last turn is not an assistant turn.
    pub fn append_delta(&mut self, delta: &str) -> bool {
        match self.messages.last_mut() {
            Some(m) if m.role == Role::Assistant => {
                m.content.push_str(delta);
                true
            }
            _ => false,
        }
    }

    /// Overwrite the trailing assistant turn, e.g. with an apology.
    pub fn replace_last_assistant(&mut self, content: impl Into<String>) -> bool {
        match self.messages.last_mut() {
            Some(m) if m.role == Role::Assistant => {
                m.content = content.into();
                true
            }
            _ => false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
