//! The conversation store.

use std::sync::Arc;

use tokio::sync::watch;

use super::Conversation;
use crate::error::ConversationError;
use crate::models::{Message, MessageId, ResponseMetrics, Source};

/// Values that replace the accumulated ones when a message is finalized.
///
/// Fields left as `None` keep whatever the incremental mutations produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalizeOverrides {
    pub content: Option<String>,
    pub sources: Option<Vec<Source>>,
    pub metadata: Option<ResponseMetrics>,
}

/// Ordered message log with id-addressed mutation.
///
/// Every mutation publishes a new [`Conversation`] snapshot; readers never
/// see a half-applied change. At most one message streams at a time.
#[derive(Debug)]
pub struct ConversationStore {
    messages: Arc<Vec<Arc<Message>>>,
    snapshots: watch::Sender<Conversation>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(Conversation::default());
        Self {
            messages: Arc::new(Vec::new()),
            snapshots,
        }
    }

    /// Append a complete user message.
    pub fn append_user(&mut self, text: impl Into<String>) -> MessageId {
        self.push(Message::user(text))
    }

    /// Append an empty, streaming assistant placeholder.
    ///
    /// Refused while another message is still streaming.
    pub fn begin_assistant_turn(&mut self) -> Result<MessageId, ConversationError> {
        if let Some(active) = self.streaming_message() {
            return Err(ConversationError::StreamAlreadyActive { active });
        }
        Ok(self.push(Message::assistant_placeholder()))
    }

    /// Append a streamed text fragment to a message.
    ///
    /// The previous snapshot is still held by the watch channel, so the
    /// streaming message is copied before each append while every other
    /// message stays shared. Over a whole answer that copying is quadratic
    /// in its length, which is accepted for chat-sized answers.
    pub fn apply_token(&mut self, id: MessageId, delta: &str) -> Result<(), ConversationError> {
        self.mutate(id, |message| message.append_token(delta))
    }

    /// Replace a message's sources wholesale.
    pub fn apply_sources(
        &mut self,
        id: MessageId,
        sources: Vec<Source>,
    ) -> Result<(), ConversationError> {
        self.mutate(id, |message| message.sources = sources)
    }

    /// Set a message's metrics.
    pub fn apply_metadata(
        &mut self,
        id: MessageId,
        metrics: ResponseMetrics,
    ) -> Result<(), ConversationError> {
        self.mutate(id, |message| message.metadata = Some(metrics))
    }

    /// Mark a message complete, applying any overrides.
    ///
    /// Fails with [`ConversationError::MessageFinalized`] if it already was,
    /// so each turn is finalized exactly once.
    pub fn finalize(
        &mut self,
        id: MessageId,
        overrides: FinalizeOverrides,
    ) -> Result<(), ConversationError> {
        self.mutate(id, |message| {
            if let Some(content) = overrides.content {
                message.content = content;
            }
            if let Some(sources) = overrides.sources {
                message.sources = sources;
            }
            if let Some(metadata) = overrides.metadata {
                message.metadata = Some(metadata);
            }
            message.finalize();
        })
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Conversation {
        Conversation::from_shared(Arc::clone(&self.messages))
    }

    /// Receive a snapshot after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<Conversation> {
        self.snapshots.subscribe()
    }

    /// Id of the message that is still streaming, if any.
    pub fn streaming_message(&self) -> Option<MessageId> {
        self.messages.iter().find(|m| m.streaming).map(|m| m.id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn push(&mut self, message: Message) -> MessageId {
        let id = message.id;
        Arc::make_mut(&mut self.messages).push(Arc::new(message));
        self.publish();
        id
    }

    fn mutate(
        &mut self,
        id: MessageId,
        apply: impl FnOnce(&mut Message),
    ) -> Result<(), ConversationError> {
        let index = self
            .messages
            .iter()
            .position(|m| m.id == id)
            .ok_or(ConversationError::MessageNotFound { id })?;
        if !self.messages[index].streaming {
            return Err(ConversationError::MessageFinalized { id });
        }

        let messages = Arc::make_mut(&mut self.messages);
        apply(Arc::make_mut(&mut messages[index]));
        self.publish();
        Ok(())
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}
