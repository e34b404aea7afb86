//! Payload parsing.
//!
//! `parse_payload` turns one payload string into a [`StreamEvent`];
//! [`EventParser`] wraps it for a single turn, logging and skipping any
//! payload that fails so one corrupt event never aborts the answer.

mod metadata;
mod sources;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::StreamError;
use crate::sse::decoder::Frame;
use crate::sse::events::{SseParseError, StreamEvent};
use crate::sse::payloads::{EnvelopePayload, ErrorPayload};

use metadata::parse_metadata_event;
use sources::parse_sources_event;

/// Parse a payload string into a typed event.
pub fn parse_payload(payload: &str) -> Result<StreamEvent, SseParseError> {
    let value: Value = serde_json::from_str(payload).map_err(|e| SseParseError::InvalidJson {
        source: e.to_string(),
    })?;
    if value.get("type").and_then(Value::as_str).is_none() {
        return Err(SseParseError::MissingType);
    }
    let envelope: EnvelopePayload =
        serde_json::from_value(value).map_err(|e| SseParseError::InvalidJson {
            source: e.to_string(),
        })?;

    match envelope.kind.as_str() {
        "token" => parse_token_event(envelope.data),
        "sources" => parse_sources_event(envelope.data),
        "metadata" => parse_metadata_event(envelope.data),
        "error" => parse_error_event(envelope.data),
        _ => Ok(StreamEvent::Unknown {
            kind: envelope.kind,
        }),
    }
}

fn parse_token_event(data: Value) -> Result<StreamEvent, SseParseError> {
    match data {
        Value::String(delta) => Ok(StreamEvent::Token { delta }),
        other => Err(invalid("token", format!("expected a string, got {}", other))),
    }
}

fn parse_error_event(data: Value) -> Result<StreamEvent, SseParseError> {
    let payload: ErrorPayload =
        serde_json::from_value(data).map_err(|e| invalid("error", e.to_string()))?;
    Ok(StreamEvent::Error {
        message: payload.into_message(),
    })
}

pub(super) fn invalid(event_type: &str, message: impl Into<String>) -> SseParseError {
    SseParseError::InvalidPayload {
        event_type: event_type.to_string(),
        message: message.into(),
    }
}

/// Per-turn parser over decoded frames.
#[derive(Debug, Default)]
pub struct EventParser {
    skipped: usize,
}

impl EventParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a frame, returning `None` for payloads that were skipped.
    pub fn parse(&mut self, frame: Frame) -> Option<StreamEvent> {
        let payload = match frame {
            Frame::Done => return Some(StreamEvent::Done),
            Frame::Payload(payload) => payload,
        };

        match parse_payload(&payload) {
            Ok(StreamEvent::Unknown { kind }) => {
                debug!("Ignoring unknown stream event type: {}", kind);
                Some(StreamEvent::Unknown { kind })
            }
            Ok(event) => Some(event),
            Err(e) => {
                self.skipped += 1;
                let err = StreamError::from(e);
                warn!(
                    code = err.error_code(),
                    "Skipping malformed stream payload: {} (payload: {})",
                    err,
                    truncate(&payload, 200)
                );
                None
            }
        }
    }

    /// Number of payloads skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
