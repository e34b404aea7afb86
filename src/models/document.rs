use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata stored alongside an ingested document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Any other backend-specific fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An ingested document as listed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRecord {
    pub document_id: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

/// Response body of the documents listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentList {
    #[serde(default)]
    pub documents: Vec<DocumentRecord>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}
