//! `sources` event parser

use serde_json::Value;

use super::invalid;
use crate::models::Source;
use crate::sse::events::{SseParseError, StreamEvent};
use crate::sse::payloads::SourcePayload;

/// Parse a `sources` event. The list replaces any earlier one and keeps
/// the backend's rank order.
pub(super) fn parse_sources_event(data: Value) -> Result<StreamEvent, SseParseError> {
    let payloads: Vec<SourcePayload> =
        serde_json::from_value(data).map_err(|e| invalid("sources", e.to_string()))?;

    let sources = payloads.into_iter().map(into_source).collect();
    Ok(StreamEvent::Sources { sources })
}

fn into_source(payload: SourcePayload) -> Source {
    let title = payload
        .title
        .or_else(|| payload.metadata.and_then(|m| m.title));
    let excerpt = payload.excerpt.or(payload.content).unwrap_or_default();
    Source::new(title, excerpt, payload.similarity.unwrap_or(0.0))
}
