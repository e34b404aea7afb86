use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request body for `POST /api/v1/query/stream`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRequest {
    /// Natural-language question
    pub query: String,
    /// Optional retrieval filters passed through to the vector store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Map<String, Value>>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: None,
        }
    }

    pub fn with_filters(mut self, filters: Option<Map<String, Value>>) -> Self {
        self.filters = filters.filter(|f| !f.is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_omits_missing_filters() {
        let json = serde_json::to_value(QueryRequest::new("revenue 2023")).unwrap();
        assert_eq!(json, serde_json::json!({"query": "revenue 2023"}));
    }

    #[test]
    fn test_query_request_with_filters() {
        let mut filters = Map::new();
        filters.insert("document_type".into(), Value::String("10-K".into()));
        let json =
            serde_json::to_value(QueryRequest::new("q").with_filters(Some(filters))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"query": "q", "filters": {"document_type": "10-K"}})
        );
    }

    #[test]
    fn test_empty_filters_are_dropped() {
        let request = QueryRequest::new("q").with_filters(Some(Map::new()));
        assert!(request.filters.is_none());
    }
}
