//! Client configuration.
//!
//! Defaults, environment overrides and validation for the connection to the
//! RAG backend.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Timeout for plain request/response calls. Streams are never timed out.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the documents router is mounted. Backends that mount it straight
/// on the API root serve it at `/api/v1`.
pub const DEFAULT_DOCUMENTS_PATH: &str = "/api/v1/documents";

pub const ENV_URL: &str = "RAGSTREAM_URL";
pub const ENV_TOKEN: &str = "RAGSTREAM_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "RAGSTREAM_TIMEOUT_SECS";
pub const ENV_DOCUMENTS_PATH: &str = "RAGSTREAM_DOCUMENTS_PATH";

/// Connection settings for the RAG backend.
///
/// # Example
///
/// ```ignore
/// use ragstream::config::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_base_url("https://rag.example.com/")
///     .with_auth_token(Some("secret".to_string()));
/// config.validate()?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL without a trailing slash
    pub base_url: String,
    /// Bearer token sent with every request
    pub auth_token: Option<String>,
    /// Timeout for non-streaming calls
    pub request_timeout: Duration,
    /// Retrieval filters sent with every query
    pub filters: Option<Map<String, Value>>,
    /// Mount point of the document routes, leading `/`, no trailing `/`
    pub documents_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            filters: None,
            documents_path: DEFAULT_DOCUMENTS_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL. Surrounding whitespace and trailing slashes are dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim().trim_end_matches('/').to_string();
        self
    }

    /// Set the bearer token. A blank token clears it.
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_filters(mut self, filters: Option<Map<String, Value>>) -> Self {
        self.filters = filters;
        self
    }

    /// Set where the document routes live, e.g. `/api/v1`.
    pub fn with_documents_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = path.trim().trim_matches('/');
        self.documents_path = if path.is_empty() {
            String::new()
        } else {
            format!("/{}", path)
        };
        self
    }

    /// Build config from `RAGSTREAM_URL`, `RAGSTREAM_TOKEN`,
    /// `RAGSTREAM_TIMEOUT_SECS` and `RAGSTREAM_DOCUMENTS_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_URL) {
            config = config.with_base_url(url);
        }
        config = config.with_auth_token(lookup(ENV_TOKEN));
        if let Some(path) = lookup(ENV_DOCUMENTS_PATH) {
            config = config.with_documents_path(path);
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Check the base URL is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(())
    }

    /// Absolute URL for an API path such as `/health`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
