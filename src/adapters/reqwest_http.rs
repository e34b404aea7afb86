//! reqwest-backed transport.
//!
//! Plain calls honour the configured request timeout. Streaming calls are
//! never timed out on the body: an answer may take arbitrarily long to
//! generate.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::RequestBuilder;

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// [`HttpClient`] over a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    request_timeout: Option<Duration>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing connection pool.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            request_timeout: None,
        }
    }

    /// Timeout for [`get`](HttpClient::get), [`post`](HttpClient::post) and
    /// [`delete`](HttpClient::delete).
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    async fn send(
        &self,
        request: RequestBuilder,
        headers: &Headers,
        timed: bool,
    ) -> Result<reqwest::Response, HttpError> {
        let mut request = headers
            .iter()
            .fold(request, |request, (name, value)| request.header(name, value));
        if let (true, Some(timeout)) = (timed, self.request_timeout) {
            request = request.timeout(timeout);
        }
        request.send().await.map_err(send_error)
    }

    async fn buffered(
        &self,
        request: RequestBuilder,
        headers: &Headers,
    ) -> Result<Response, HttpError> {
        let response = self.send(request, headers, true).await?;
        let status = response.status().as_u16();
        let headers = header_map(response.headers());
        let body = response.bytes().await.map_err(body_error)?;
        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

fn send_error(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout(err.to_string())
    } else if err.is_connect() {
        HttpError::Connect(err.to_string())
    } else if err.is_builder() {
        HttpError::InvalidUrl(err.to_string())
    } else {
        HttpError::Other(err.to_string())
    }
}

fn body_error(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout(err.to_string())
    } else {
        HttpError::Body(err.to_string())
    }
}

/// Headers with non-UTF-8 values dropped.
fn header_map(headers: &HeaderMap) -> Headers {
    headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect()
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.buffered(self.client.get(url), headers).await
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.buffered(self.client.post(url).body(body.to_owned()), headers)
            .await
    }

    async fn delete(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.buffered(self.client.delete(url), headers).await
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        let request = self.client.post(url).body(body.to_owned());
        let response = self.send(request, headers, false).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(body_error)),
        ))
    }
}
