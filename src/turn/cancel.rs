//! Cancellation of the in-flight turn.

use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

/// Slot holding the token of the turn in flight, if any.
pub(crate) type CancelSlot = Arc<Mutex<Option<CancellationToken>>>;

/// Cancels whichever turn is in flight when [`cancel`](Self::cancel) is called.
///
/// Cheap to clone; safe to call from a signal handler task.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    slot: CancelSlot,
}

impl CancelHandle {
    pub(crate) fn new(slot: CancelSlot) -> Self {
        Self { slot }
    }

    /// Abort the current turn. Returns `false` if no turn was in flight.
    pub fn cancel(&self) -> bool {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether a turn is currently in flight.
    pub fn is_active(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_without_turn() {
        let handle = CancelHandle::new(Arc::new(Mutex::new(None)));
        assert!(!handle.is_active());
        assert!(!handle.cancel());
    }

    #[test]
    fn test_cancel_active_turn() {
        let token = CancellationToken::new();
        let handle = CancelHandle::new(Arc::new(Mutex::new(Some(token.clone()))));
        assert!(handle.is_active());
        assert!(handle.cancel());
        assert!(token.is_cancelled());
    }
}
