//! Observable turn state for the presentation layer.

use super::TurnPhase;
use crate::conversation::Conversation;

/// Everything a renderer needs, published after every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnView {
    /// Conversation snapshot
    pub conversation: Conversation,
    /// Current phase
    pub phase: TurnPhase,
    /// Whether a turn is in flight
    pub loading: bool,
    /// User-facing error for the current or last turn
    pub error: Option<String>,
}

impl TurnView {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
