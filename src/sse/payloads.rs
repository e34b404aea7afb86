//! Internal payload deserialization structs.
//!
//! These mirror the JSON the backend puts on `data:` lines and are only
//! used inside the parser.

use serde::Deserialize;
use serde_json::Value;

/// `{"type": ..., "data": ...}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EnvelopePayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

/// One retrieved source.
///
/// The backend sends `{content, metadata: {title}, similarity}`; the flat
/// `{title, excerpt, similarity}` shape is accepted as well.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SourcePayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub metadata: Option<SourceMetadataPayload>,
    #[serde(default)]
    pub similarity: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SourceMetadataPayload {
    #[serde(default)]
    pub title: Option<String>,
}

/// Raw backend metrics.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MetadataPayload {
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Milliseconds
    #[serde(default)]
    pub response_time: Option<f64>,
    #[serde(default)]
    pub sources_count: Option<f64>,
    #[serde(default)]
    pub query_id: Option<String>,
}

/// `error` data: a bare string or `{"message": ...}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorPayload {
    Text(String),
    Object { message: String },
}

impl ErrorPayload {
    pub fn into_message(self) -> String {
        match self {
            ErrorPayload::Text(message) | ErrorPayload::Object { message } => message,
        }
    }
}
