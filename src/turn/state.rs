//! Turn lifecycle types.

use std::fmt;

use crate::models::MessageId;

/// Phase of the current turn.
///
/// `Idle → Submitting → Streaming → Finalizing → Idle`, with
/// `Submitting | Streaming → Failed → Idle` on error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPhase {
    #[default]
    Idle,
    /// Waiting for the backend to accept the query
    Submitting,
    /// Receiving answer events
    Streaming,
    /// Stream ended; completing the assistant message
    Finalizing,
    /// The turn failed; returns to `Idle` right after
    Failed,
}

impl TurnPhase {
    /// Whether the loading indicator should be shown.
    pub fn is_loading(self) -> bool {
        matches!(
            self,
            TurnPhase::Submitting | TurnPhase::Streaming | TurnPhase::Finalizing
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TurnPhase::Idle => "idle",
            TurnPhase::Submitting => "submitting",
            TurnPhase::Streaming => "streaming",
            TurnPhase::Finalizing => "finalizing",
            TurnPhase::Failed => "failed",
        }
    }
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a submission was not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The query was empty or whitespace
    EmptyQuery,
    /// Another turn is still in flight
    Busy,
}

/// Result of [`TurnController::submit`](super::TurnController::submit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The stream ended normally and the answer was finalized
    Completed { message_id: MessageId },
    /// The turn failed. `message_id` is set if an answer was started; that
    /// message has been finalized with whatever arrived.
    Failed {
        message_id: Option<MessageId>,
        error: String,
    },
    /// Nothing was submitted
    Rejected(RejectReason),
}

impl TurnOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed { .. })
    }

    /// The assistant message this turn produced, if any.
    pub fn message_id(&self) -> Option<MessageId> {
        match self {
            TurnOutcome::Completed { message_id } => Some(*message_id),
            TurnOutcome::Failed { message_id, .. } => *message_id,
            TurnOutcome::Rejected(_) => None,
        }
    }
}
