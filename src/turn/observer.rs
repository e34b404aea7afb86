//! Lifecycle callbacks.

use super::TurnPhase;
use crate::models::{Message, MessageId, ResponseMetrics, Source};

/// Receives turn events as they are applied.
///
/// Every method has an empty default, so implementors only override what
/// they render. Callbacks run on the submitting task and must not block.
pub trait TurnObserver: Send + Sync {
    fn on_phase(&self, _phase: TurnPhase) {}

    fn on_token(&self, _message_id: MessageId, _delta: &str) {}

    fn on_sources(&self, _message_id: MessageId, _sources: &[Source]) {}

    fn on_metadata(&self, _message_id: MessageId, _metrics: &ResponseMetrics) {}

    /// A user-facing error was recorded.
    fn on_error(&self, _message: &str) {}

    /// The assistant message is complete and will not change again.
    fn on_finalized(&self, _message: &Message) {}
}
