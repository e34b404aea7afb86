//! RAG backend API client.
//!
//! Opens the streaming query endpoint and wraps the small request/response
//! calls around it (feedback, document listing and deletion, health).

use std::sync::Arc;

use tracing::{debug, info};

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::{NetworkError, RagResult};
use crate::models::{DocumentList, Feedback, QueryRequest};
use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

pub const QUERY_STREAM_PATH: &str = "/api/v1/query/stream";
pub const FEEDBACK_PATH: &str = "/api/v1/evaluation/feedback";
pub const HEALTH_PATH: &str = "/health";

/// Client for the RAG backend.
///
/// The HTTP layer is injected through [`HttpClient`] so tests can script
/// the transport.
#[derive(Clone)]
pub struct RagClient {
    config: ClientConfig,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for RagClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagClient")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl RagClient {
    /// Create a client backed by reqwest.
    pub fn new(config: ClientConfig) -> Self {
        let http = ReqwestHttpClient::new().with_timeout(Some(config.request_timeout));
        Self::with_http(config, Arc::new(http))
    }

    /// Create a client over any [`HttpClient`].
    pub fn with_http(config: ClientConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the request body for a question, including configured filters.
    pub fn query_request(&self, query: &str) -> QueryRequest {
        QueryRequest::new(query).with_filters(self.config.filters.clone())
    }

    /// Open the answer stream for a query.
    ///
    /// Resolves once the backend has accepted the request; a non-2xx status
    /// or a connection failure is returned before any byte is read.
    pub async fn stream_query(&self, request: &QueryRequest) -> RagResult<ByteStream> {
        let url = self.config.endpoint(QUERY_STREAM_PATH);
        let body = serde_json::to_string(request)?;

        debug!("Opening answer stream at {}", url);
        let stream = self
            .http
            .post_stream(&url, &body, &self.headers("text/event-stream"))
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;
        debug!("Answer stream opened");
        Ok(stream)
    }

    /// Submit a rating for an answered query.
    pub async fn submit_feedback(&self, feedback: &Feedback) -> RagResult<()> {
        let url = self.config.endpoint(FEEDBACK_PATH);
        let body = serde_json::to_string(feedback)?;

        self.http
            .post(&url, &body, &self.headers("application/json"))
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| NetworkError::from_http(e, &url))?;
        info!("Feedback recorded for query {}", feedback.query_id);
        Ok(())
    }

    /// List ingested documents, one page at a time.
    ///
    /// The listing route is the mount point's `/`, so the URL keeps the
    /// trailing slash.
    pub async fn list_documents(&self, limit: u32, offset: u32) -> RagResult<DocumentList> {
        let url = format!(
            "{}/?limit={}&offset={}",
            self.config.endpoint(&self.config.documents_path),
            limit,
            offset
        );

        let response = self
            .http
            .get(&url, &self.headers("application/json"))
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| NetworkError::from_http(e, &url))?;
        Ok(response.json()?)
    }

    /// Delete a document and its chunks.
    pub async fn delete_document(&self, document_id: &str) -> RagResult<()> {
        let url = format!(
            "{}/{}",
            self.config.endpoint(&self.config.documents_path),
            urlencoding::encode(document_id)
        );

        self.http
            .delete(&url, &self.headers("application/json"))
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| NetworkError::from_http(e, &url))?;
        info!("Deleted document {}", document_id);
        Ok(())
    }

    /// Check whether the backend is reachable and healthy.
    ///
    /// A non-2xx status is `Ok(false)`; a transport failure is an error.
    pub async fn health_check(&self) -> RagResult<bool> {
        let url = self.config.endpoint(HEALTH_PATH);

        match self.http.get(&url, &self.headers("application/json")).await {
            Ok(response) => Ok(response.is_success()),
            Err(HttpError::Status { .. }) => Ok(false),
            Err(e) => Err(NetworkError::from_http(e, &url).into()),
        }
    }

    fn headers(&self, accept: &str) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), accept.to_string());
        if let Some(token) = &self.config.auth_token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        headers
    }
}
