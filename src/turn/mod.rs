//! Turn control.
//!
//! [`TurnController`] runs the `Idle → Submitting → Streaming → Finalizing`
//! state machine for each query and exposes the result as [`TurnView`]s and
//! [`TurnObserver`] callbacks.

mod cancel;
mod controller;
mod observer;
mod state;
mod view;

pub use cancel::CancelHandle;
pub use controller::TurnController;
pub use observer::TurnObserver;
pub use state::{RejectReason, TurnOutcome, TurnPhase};
pub use view::TurnView;
