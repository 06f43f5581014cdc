use futures::StreamExt;
use providers::StreamIngestor;
use services::code_blocks::extract_code_blocks;
use services::file_store::FileStore;
use shared::conversation::Conversation;

pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input; nothing was sent.
    Ignored,
    Completed { created_files: Vec<String> },
    /// The reply was replaced with [`APOLOGY`].
    Failed,
}

/// One chat session: the transcript, the generated files, and the ingestor
/// that produces replies.
pub struct ChatSession {
    conversation: Conversation,
    files: FileStore,
    ingestor: StreamIngestor,
}

impl ChatSession {
    pub fn new(ingestor: StreamIngestor, files: FileStore) -> Self {
        Self {
            conversation: Conversation::new(),
            files,
            ingestor,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn files(&self) -> &FileStore {
        &self.files
    }

    /// Send `text` and stream the reply into the transcript, calling
    /// `on_delta` for each fragment as it arrives.
    pub async fn send(&mut self, text: &str, mut on_delta: impl FnMut(&str)) -> TurnOutcome {
        if text.trim().is_empty() {
            return TurnOutcome::Ignored;
        }

        self.conversation.push_user(text);
        let mut deltas = self.ingestor.produce_deltas(self.conversation.messages());
        self.conversation.begin_assistant();

        while let Some(item) = deltas.next().await {
            match item {
                Ok(delta) => {
                    self.conversation.append_delta(&delta);
                    on_delta(&delta);
                }
                Err(e) => {
                    tracing::error!(error = %e, "assistant turn failed");
                    self.conversation.replace_last_assistant(APOLOGY);
                    return TurnOutcome::Failed;
                }
            }
        }

        let reply = self
            .conversation
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let blocks = extract_code_blocks(reply);
        let created_files = self.files.create_files_from_code(&blocks);
        TurnOutcome::Completed { created_files }
    }
}
