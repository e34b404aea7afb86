//! The turn state machine.
//!
//! One `submit` call drives a full round trip: the user message is appended,
//! the answer stream is opened, each event is applied to the store as it is
//! parsed, and the assistant message is finalized on every exit path.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cancel::{CancelHandle, CancelSlot};
use super::{RejectReason, TurnObserver, TurnOutcome, TurnPhase, TurnView};
use crate::client::RagClient;
use crate::conversation::{Conversation, ConversationStore, FinalizeOverrides};
use crate::error::{RagError, StreamError};
use crate::models::{Feedback, MessageId, Rating};
use crate::sse::{event_stream, StreamEvent};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct TurnStatus {
    phase: TurnPhase,
    error: Option<String>,
    /// Query id reported by the turn in flight
    pending_query_id: Option<String>,
    /// Query id of the last finalized turn, target of feedback
    last_query_id: Option<String>,
}

struct Shared {
    client: RagClient,
    store: Mutex<ConversationStore>,
    status: Mutex<TurnStatus>,
    cancel_slot: CancelSlot,
    view: watch::Sender<TurnView>,
    observer: Option<Arc<dyn TurnObserver>>,
}

/// Drives query turns against the backend and owns the conversation.
///
/// Cloning shares the same conversation. Only one turn runs at a time;
/// locks are never held across an `.await`.
#[derive(Clone)]
pub struct TurnController {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for TurnController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnController")
            .field("phase", &self.phase())
            .field("client", &self.shared.client)
            .finish()
    }
}

/// Finalizes the turn if `submit` is dropped before it returns.
struct TurnGuard<'a> {
    controller: &'a TurnController,
    message_id: Option<MessageId>,
    armed: bool,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        debug!("Turn abandoned before completion");
        if let Some(id) = self.message_id {
            self.controller.finalize(id);
        }
        self.controller.end_turn();
    }
}

impl TurnController {
    pub fn new(client: RagClient) -> Self {
        Self::build(client, None)
    }

    /// Create a controller that reports lifecycle events to `observer`.
    pub fn with_observer(client: RagClient, observer: Arc<dyn TurnObserver>) -> Self {
        Self::build(client, Some(observer))
    }

    fn build(client: RagClient, observer: Option<Arc<dyn TurnObserver>>) -> Self {
        let (view, _) = watch::channel(TurnView::default());
        Self {
            shared: Arc::new(Shared {
                client,
                store: Mutex::new(ConversationStore::new()),
                status: Mutex::new(TurnStatus::default()),
                cancel_slot: Arc::new(Mutex::new(None)),
                view,
                observer,
            }),
        }
    }

    pub fn client(&self) -> &RagClient {
        &self.shared.client
    }

    /// Receive a [`TurnView`] after every change.
    pub fn subscribe(&self) -> watch::Receiver<TurnView> {
        self.shared.view.subscribe()
    }

    /// The most recently published view.
    pub fn view(&self) -> TurnView {
        self.shared.view.borrow().clone()
    }

    pub fn conversation(&self) -> Conversation {
        lock(&self.shared.store).snapshot()
    }

    pub fn phase(&self) -> TurnPhase {
        lock(&self.shared.status).phase
    }

    /// Query id of the last finalized answer, if the backend reported one.
    pub fn last_query_id(&self) -> Option<String> {
        lock(&self.shared.status).last_query_id.clone()
    }

    /// Handle that aborts the turn in flight.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle::new(Arc::clone(&self.shared.cancel_slot))
    }

    /// Run one turn for `query`.
    ///
    /// Rejected without side effects if the query is blank or a turn is
    /// already in flight. Errors never escape: they are recorded in the
    /// view's error slot and reported in the outcome.
    pub async fn submit(&self, query: &str) -> TurnOutcome {
        let query = query.trim();
        if query.is_empty() {
            return TurnOutcome::Rejected(RejectReason::EmptyQuery);
        }
        let Some(token) = self.begin_turn() else {
            debug!("Rejecting submission while a turn is in flight");
            return TurnOutcome::Rejected(RejectReason::Busy);
        };

        lock(&self.shared.store).append_user(query);
        self.enter(TurnPhase::Submitting);

        let mut guard = TurnGuard {
            controller: self,
            message_id: None,
            armed: true,
        };

        let request = self.shared.client.query_request(query);
        let opened = tokio::select! {
            biased;
            _ = token.cancelled() => Err(RagError::from(StreamError::Cancelled)),
            result = self.shared.client.stream_query(&request) => result,
        };
        let body = match opened {
            Ok(body) => body,
            Err(err) => {
                guard.armed = false;
                return self.fail(None, err);
            }
        };

        let begun = lock(&self.shared.store).begin_assistant_turn();
        let message_id = match begun {
            Ok(id) => id,
            Err(err) => {
                guard.armed = false;
                return self.fail(None, err.into());
            }
        };
        guard.message_id = Some(message_id);
        self.enter(TurnPhase::Streaming);

        let mut events = event_stream(body);
        let failure = loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => Err(StreamError::Cancelled),
                next = events.next() => Ok(next),
            };
            match next {
                Ok(Some(Ok(event))) => self.apply_event(message_id, event),
                Ok(Some(Err(err))) => {
                    break Some(StreamError::ConnectionLost {
                        message: err.to_string(),
                    })
                }
                Ok(None) => break None,
                Err(cancelled) => break Some(cancelled),
            }
        };
        // Release the transport before finalizing
        drop(events);
        guard.armed = false;

        match failure {
            None => {
                self.enter(TurnPhase::Finalizing);
                self.finalize(message_id);
                self.end_turn();
                info!("Turn completed");
                TurnOutcome::Completed { message_id }
            }
            Some(err) => {
                self.finalize(message_id);
                self.fail(Some(message_id), err.into())
            }
        }
    }

    /// Send a rating for the last finalized answer.
    ///
    /// Delivery happens in the background; failures are logged and never
    /// retried. Returns `false` if there is no answer to rate.
    pub fn send_feedback(&self, rating: Rating, helpful: bool, text: Option<String>) -> bool {
        let query_id = self.last_query_id();
        let Some(query_id) = query_id else {
            debug!("No rated answer to attach feedback to");
            return false;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("Feedback dropped: no async runtime to deliver it on");
            return false;
        };

        let feedback = Feedback::new(query_id, rating)
            .with_helpful(helpful)
            .with_text(text);
        let client = self.shared.client.clone();
        runtime.spawn(async move {
            if let Err(err) = client.submit_feedback(&feedback).await {
                warn!(
                    code = err.error_code(),
                    "Failed to deliver feedback for query {}: {}", feedback.query_id, err
                );
            }
        });
        true
    }

    /// Reserve the controller for a new turn.
    fn begin_turn(&self) -> Option<CancellationToken> {
        {
            let mut status = lock(&self.shared.status);
            if status.phase != TurnPhase::Idle {
                return None;
            }
            status.phase = TurnPhase::Submitting;
            status.error = None;
            status.pending_query_id = None;
        }
        let token = CancellationToken::new();
        *lock(&self.shared.cancel_slot) = Some(token.clone());
        Some(token)
    }

    fn apply_event(&self, id: MessageId, event: StreamEvent) {
        let applied = match event {
            StreamEvent::Token { delta } => {
                let result = lock(&self.shared.store).apply_token(id, &delta);
                if result.is_ok() {
                    self.notify(|o| o.on_token(id, &delta));
                }
                result
            }
            StreamEvent::Sources { sources } => {
                let result = lock(&self.shared.store).apply_sources(id, sources.clone());
                if result.is_ok() {
                    self.notify(|o| o.on_sources(id, &sources));
                }
                result
            }
            StreamEvent::Metadata { metrics, query_id } => {
                if query_id.is_some() {
                    lock(&self.shared.status).pending_query_id = query_id;
                }
                let result = lock(&self.shared.store).apply_metadata(id, metrics.clone());
                if result.is_ok() {
                    self.notify(|o| o.on_metadata(id, &metrics));
                }
                result
            }
            StreamEvent::Error { message } => {
                let err = StreamError::BackendError { message };
                warn!(code = err.error_code(), "{}", err);
                let message = err.user_message();
                lock(&self.shared.status).error = Some(message.clone());
                self.notify(|o| o.on_error(&message));
                Ok(())
            }
            StreamEvent::Done => {
                debug!("Received end-of-answer marker");
                return;
            }
            StreamEvent::Unknown { .. } => return,
        };

        match applied {
            Ok(()) => self.publish(),
            Err(err) => warn!("Dropping stream event for message {}: {}", id, err),
        }
    }

    fn finalize(&self, id: MessageId) {
        let finalized = lock(&self.shared.store).finalize(id, FinalizeOverrides::default());
        if let Err(err) = finalized {
            warn!("Could not finalize message {}: {}", id, err);
            return;
        }
        {
            let mut status = lock(&self.shared.status);
            status.last_query_id = status.pending_query_id.take();
        }

        let snapshot = self.conversation();
        if let Some(message) = snapshot.get(id) {
            self.notify(|o| o.on_finalized(message));
        }
        self.publish();
    }

    fn fail(&self, message_id: Option<MessageId>, err: RagError) -> TurnOutcome {
        let message = err.user_message();
        warn!(
            code = err.error_code(),
            category = %err.category(),
            "Turn failed: {}", err
        );
        {
            let mut status = lock(&self.shared.status);
            status.phase = TurnPhase::Failed;
            status.error = Some(message.clone());
        }
        self.notify(|o| {
            o.on_error(&message);
            o.on_phase(TurnPhase::Failed);
        });
        self.publish();
        self.end_turn();

        TurnOutcome::Failed {
            message_id,
            error: message,
        }
    }

    fn end_turn(&self) {
        *lock(&self.shared.cancel_slot) = None;
        self.enter(TurnPhase::Idle);
    }

    fn enter(&self, phase: TurnPhase) {
        lock(&self.shared.status).phase = phase;
        debug!("Turn phase: {}", phase);
        self.notify(|o| o.on_phase(phase));
        self.publish();
    }

    fn notify(&self, f: impl FnOnce(&dyn TurnObserver)) {
        if let Some(observer) = &self.shared.observer {
            f(observer.as_ref());
        }
    }

    fn publish(&self) {
        let conversation = self.conversation();
        let (phase, error) = {
            let status = lock(&self.shared.status);
            (status.phase, status.error.clone())
        };
        self.shared.view.send_replace(TurnView {
            conversation,
            phase,
            loading: phase.is_loading(),
            error,
        });
    }
}
