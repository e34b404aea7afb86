//! Conversation store errors.

use thiserror::Error;

use crate::models::MessageId;

/// Refused or misdirected store mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    /// Another assistant message is still streaming.
    #[error("message {active} is still streaming")]
    StreamAlreadyActive { active: MessageId },

    /// No message with this id exists.
    #[error("message {id} not found")]
    MessageNotFound { id: MessageId },

    /// The message has already been finalized and is immutable.
    #[error("message {id} is already finalized")]
    MessageFinalized { id: MessageId },
}
