//! Conversation data model.
//!
//! Messages, retrieved sources, response metrics and the request/response
//! shapes exchanged with the RAG backend.

mod document;
mod feedback;
mod message;
mod metrics;
mod request;
mod source;

pub use document::{DocumentList, DocumentMetadata, DocumentRecord};
pub use feedback::{Feedback, Rating};
pub use message::{Message, MessageId, MessageRole};
pub use metrics::{Citations, ResponseMetrics, TokenUsage};
pub use request::QueryRequest;
pub use source::{Source, UNTITLED_SOURCE};

/// Clamp a backend-reported score into `[0, 1]`, mapping NaN to 0.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
