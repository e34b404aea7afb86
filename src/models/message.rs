use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::metrics::ResponseMetrics;
use super::source::Source;

/// Opaque message identifier, assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// One conversation turn.
///
/// User and system messages are complete at creation. Assistant messages
/// start as an empty placeholder with `streaming = true` and grow as
/// stream events arrive; once `streaming` flips to false they never change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Stable identifier used for all targeted mutations
    pub id: MessageId,
    /// User question or assistant answer
    pub role: MessageRole,
    /// Text content; append-only while streaming
    pub content: String,
    /// Set once, when the message is appended
    pub created_at: DateTime<Utc>,
    /// Whether the assistant is still receiving events for this message
    #[serde(default)]
    pub streaming: bool,
    /// Retrieved sources in retrieval-rank order
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Response metrics, absent until the metadata event arrives
    #[serde(default)]
    pub metadata: Option<ResponseMetrics>,
}

impl Message {
    fn with_role(role: MessageRole, content: String, streaming: bool) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content,
            created_at: Utc::now(),
            streaming,
            sources: Vec::new(),
            metadata: None,
        }
    }

    /// Create a complete user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content.into(), false)
    }

    /// Create an empty assistant placeholder that is still streaming.
    pub fn assistant_placeholder() -> Self {
        Self::with_role(MessageRole::Assistant, String::new(), true)
    }

    /// Append a streamed text fragment.
    pub fn append_token(&mut self, delta: &str) {
        self.content.push_str(delta);
    }

    /// Mark the message complete. Returns `false` if it was already final.
    pub fn finalize(&mut self) -> bool {
        if !self.streaming {
            return false;
        }
        self.streaming = false;
        true
    }
}
