//! Conversation state.
//!
//! [`ConversationStore`] owns the ordered message list and is the only
//! writer; readers hold [`Conversation`] snapshots.

mod snapshot;
mod store;

pub use snapshot::Conversation;
pub use store::{ConversationStore, FinalizeOverrides};
