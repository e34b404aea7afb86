//! Typed stream events.

use std::fmt;

use crate::error::StreamError;
use crate::models::{ResponseMetrics, Source};

/// Event produced by the parser for each meaningful payload.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Incremental answer text
    Token { delta: String },
    /// The full retrieved-sources list, replacing any earlier one
    Sources { sources: Vec<Source> },
    /// Quality metrics for the answer
    Metadata {
        metrics: ResponseMetrics,
        /// Backend id of the query, needed to attach feedback
        query_id: Option<String>,
    },
    /// Turn-level error reported by the backend
    Error { message: String },
    /// The `[DONE]` marker
    Done,
    /// A discriminator this client does not know
    Unknown { kind: String },
}

impl StreamEvent {
    /// Returns the discriminator name for logging.
    pub fn kind(&self) -> &str {
        match self {
            StreamEvent::Token { .. } => "token",
            StreamEvent::Sources { .. } => "sources",
            StreamEvent::Metadata { .. } => "metadata",
            StreamEvent::Error { .. } => "error",
            StreamEvent::Done => "done",
            StreamEvent::Unknown { kind } => kind,
        }
    }
}

/// Errors from parsing a single payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SseParseError {
    /// Payload is not a JSON object
    InvalidJson { source: String },
    /// Payload has no string `type` field
    MissingType,
    /// `data` does not have the shape its `type` requires
    InvalidPayload { event_type: String, message: String },
}

impl fmt::Display for SseParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SseParseError::InvalidJson { source } => write!(f, "Invalid JSON payload: {}", source),
            SseParseError::MissingType => write!(f, "Payload has no event type"),
            SseParseError::InvalidPayload {
                event_type,
                message,
            } => write!(f, "Invalid data for event '{}': {}", event_type, message),
        }
    }
}

impl std::error::Error for SseParseError {}

impl From<SseParseError> for StreamError {
    fn from(err: SseParseError) -> Self {
        match err {
            SseParseError::InvalidJson { source } => StreamError::InvalidPayload {
                event_type: "unknown".to_string(),
                message: source,
            },
            SseParseError::MissingType => StreamError::InvalidPayload {
                event_type: "unknown".to_string(),
                message: "missing type".to_string(),
            },
            SseParseError::InvalidPayload {
                event_type,
                message,
            } => StreamError::InvalidPayload {
                event_type,
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind() {
        assert_eq!(
            StreamEvent::Token {
                delta: String::new()
            }
            .kind(),
            "token"
        );
        assert_eq!(StreamEvent::Done.kind(), "done");
        assert_eq!(
            StreamEvent::Unknown {
                kind: "heartbeat".to_string()
            }
            .kind(),
            "heartbeat"
        );
    }

    #[test]
    fn test_parse_error_display() {
        let err = SseParseError::InvalidPayload {
            event_type: "sources".to_string(),
            message: "expected a sequence".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid data for event 'sources': expected a sequence"
        );
        assert!(SseParseError::MissingType.to_string().contains("no event type"));
    }

    #[test]
    fn test_parse_error_into_stream_error() {
        let err: StreamError = SseParseError::InvalidPayload {
            event_type: "metadata".to_string(),
            message: "bad".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "E_STREAM_PAYLOAD");
    }
}
