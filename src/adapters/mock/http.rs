//! Scripted [`HttpClient`] for tests.
//!
//! Responses are registered per URL (exact match first, then longest
//! prefix) with an optional fallback. Every call is recorded, and streams
//! handed out are counted until dropped so tests can check that each exit
//! path releases the transport.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use futures::future;
use futures::stream::{self, StreamExt};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// One call seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// `GET`, `POST` or `DELETE`
    pub method: String,
    pub url: String,
    pub headers: Headers,
    /// Present for POSTs
    pub body: Option<String>,
}

/// Scripted behaviour for a URL.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Answer a plain call
    Success(Response),
    /// Fail the call before anything is returned
    Error(HttpError),
    /// Yield the chunks, then end-of-stream
    Stream(Vec<Bytes>),
    /// Yield the chunks, then fail the read
    StreamThenError(Vec<Bytes>, HttpError),
    /// Yield the chunks, then stall forever
    StreamThenHang(Vec<Bytes>),
    /// Never answer the call at all
    Hang,
}

#[derive(Debug, Default)]
struct MockState {
    routes: HashMap<String, MockResponse>,
    fallback: Option<MockResponse>,
    requests: Vec<RecordedRequest>,
}

impl MockState {
    fn route(&self, url: &str) -> Option<MockResponse> {
        let exact = self.routes.get(url);
        let prefixed = || {
            self.routes
                .iter()
                .filter(|(pattern, _)| url.starts_with(pattern.as_str()))
                .max_by_key(|(pattern, _)| pattern.len())
                .map(|(_, response)| response)
        };
        exact
            .or_else(prefixed)
            .or(self.fallback.as_ref())
            .cloned()
    }
}

/// Decrements the open-stream count when the stream it travels with is dropped.
struct StreamLease(Arc<AtomicUsize>);

impl StreamLease {
    fn take(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for StreamLease {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory transport. Clones share scripts, history and counters.
///
/// ```ignore
/// use bytes::Bytes;
/// use ragstream::adapters::mock::{MockHttpClient, MockResponse};
///
/// let http = MockHttpClient::new();
/// http.set_response(
///     "http://localhost:8000/api/v1/query/stream",
///     MockResponse::Stream(vec![Bytes::from("data: {\"type\":\"token\",\"data\":\"Hi\"}\n")]),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    state: Arc<Mutex<MockState>>,
    open_streams: Arc<AtomicUsize>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script `url`. A URL that is not registered exactly falls back to the
    /// longest registered prefix.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        self.state().routes.insert(url.to_string(), response);
    }

    /// Script every URL without a route of its own.
    pub fn set_default_response(&self, response: MockResponse) {
        self.state().fallback = Some(response);
    }

    /// Calls made so far, oldest first.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    /// Streams handed out and not yet dropped.
    pub fn open_stream_count(&self) -> usize {
        self.open_streams.load(Ordering::SeqCst)
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call and look up its script.
    fn handle(
        &self,
        method: &str,
        url: &str,
        headers: &Headers,
        body: Option<&str>,
    ) -> Option<MockResponse> {
        let mut state = self.state();
        state.requests.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body: body.map(str::to_string),
        });
        state.route(url)
    }

    async fn plain(
        &self,
        method: &str,
        url: &str,
        headers: &Headers,
        body: Option<&str>,
    ) -> Result<Response, HttpError> {
        match self.handle(method, url, headers, body) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            Some(MockResponse::Hang) => future::pending().await,
            Some(_) => Err(HttpError::Other(format!(
                "{} {} is scripted as a stream",
                method, url
            ))),
            None => Err(unscripted(url)),
        }
    }

    fn leased(&self, body: ByteStream) -> ByteStream {
        let lease = StreamLease::take(&self.open_streams);
        Box::pin(body.map(move |chunk| {
            let _held = &lease;
            chunk
        }))
    }
}

fn unscripted(url: &str) -> HttpError {
    HttpError::Other(format!("no mock response for {}", url))
}

fn chunks(chunks: Vec<Bytes>) -> stream::Iter<std::vec::IntoIter<Result<Bytes, HttpError>>> {
    stream::iter(chunks.into_iter().map(Ok).collect::<Vec<_>>())
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.plain("GET", url, headers, None).await
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.plain("POST", url, headers, Some(body)).await
    }

    async fn delete(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.plain("DELETE", url, headers, None).await
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        let stream: ByteStream = match self.handle("POST", url, headers, Some(body)) {
            Some(MockResponse::Stream(body)) => Box::pin(chunks(body)),
            Some(MockResponse::StreamThenError(body, err)) => {
                Box::pin(chunks(body).chain(stream::once(async move { Err(err) })))
            }
            Some(MockResponse::StreamThenHang(body)) => {
                Box::pin(chunks(body).chain(stream::pending()))
            }
            Some(MockResponse::Error(err)) => return Err(err),
            Some(MockResponse::Hang) => return future::pending().await,
            Some(MockResponse::Success(_)) => {
                return Err(HttpError::Other(format!(
                    "POST {} is scripted as a plain response",
                    url
                )))
            }
            None => return Err(unscripted(url)),
        };
        Ok(self.leased(stream))
    }
}
