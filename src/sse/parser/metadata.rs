//! `metadata` event parser

use serde_json::Value;

use super::invalid;
use crate::models::ResponseMetrics;
use crate::sse::events::{SseParseError, StreamEvent};
use crate::sse::payloads::MetadataPayload;

/// Parse a `metadata` event into [`ResponseMetrics`].
pub(super) fn parse_metadata_event(data: Value) -> Result<StreamEvent, SseParseError> {
    let payload: MetadataPayload =
        serde_json::from_value(data).map_err(|e| invalid("metadata", e.to_string()))?;

    let confidence = payload
        .confidence_score
        .or(payload.confidence)
        .unwrap_or(0.0);
    let latency_ms = payload.response_time.unwrap_or(0.0);
    let sources_count = payload
        .sources_count
        .filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| n as u64)
        .unwrap_or(0);

    Ok(StreamEvent::Metadata {
        metrics: ResponseMetrics::from_backend(confidence, latency_ms, sources_count),
        query_id: payload.query_id,
    })
}
