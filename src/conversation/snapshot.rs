//! Immutable conversation snapshots.

use std::sync::Arc;

use crate::models::{Message, MessageId};

/// An immutable view of the conversation at one instant.
///
/// Cloning is cheap. Messages untouched between two snapshots share
/// storage, so [`Conversation::ptr_eq`] can short-circuit re-renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Arc<Vec<Arc<Message>>>,
}

impl Conversation {
    pub(crate) fn from_shared(messages: Arc<Vec<Arc<Message>>>) -> Self {
        Self { messages }
    }

    /// Messages in display order.
    pub fn messages(&self) -> &[Arc<Message>] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Look up a message by id.
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id).map(|m| m.as_ref())
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last().map(|m| m.as_ref())
    }

    /// Number of messages still streaming. Never more than one.
    pub fn streaming_count(&self) -> usize {
        self.messages.iter().filter(|m| m.streaming).count()
    }

    /// True if both snapshots share the same storage.
    pub fn ptr_eq(&self, other: &Conversation) -> bool {
        Arc::ptr_eq(&self.messages, &other.messages)
    }
}
