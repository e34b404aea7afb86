//! Common test utilities for integration tests.
//!
//! Wire-format line builders, a controller wired to the mock transport and
//! an observer that records every callback.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use serde_json::{json, Value};

use ragstream::adapters::mock::{MockHttpClient, MockResponse};
use ragstream::client::RagClient;
use ragstream::config::ClientConfig;
use ragstream::models::{Message, MessageId, ResponseMetrics, Source};
use ragstream::turn::{TurnController, TurnObserver, TurnPhase};

pub const STREAM_URL: &str = "http://localhost:8000/api/v1/query/stream";
pub const FEEDBACK_URL: &str = "http://localhost:8000/api/v1/evaluation/feedback";
pub const DONE_LINE: &str = "data: [DONE]\n";

pub fn event_line(kind: &str, data: Value) -> String {
    format!("data: {}\n", json!({ "type": kind, "data": data }))
}

pub fn token_line(delta: &str) -> String {
    event_line("token", json!(delta))
}

pub fn error_line(message: &str) -> String {
    event_line("error", json!(message))
}

/// Concatenate lines into one byte payload.
pub fn payload(lines: &[String]) -> Vec<u8> {
    lines.concat().into_bytes()
}

/// Split a payload into chunks of at most `size` bytes.
pub fn chunks_of(bytes: &[u8], size: usize) -> Vec<Bytes> {
    bytes
        .chunks(size.max(1))
        .map(Bytes::copy_from_slice)
        .collect()
}

/// Split a payload at a single byte offset.
pub fn split_at(bytes: &[u8], at: usize) -> Vec<Bytes> {
    let (head, tail) = bytes.split_at(at);
    vec![Bytes::copy_from_slice(head), Bytes::copy_from_slice(tail)]
}

pub fn mock_with_stream(response: MockResponse) -> MockHttpClient {
    let mock = MockHttpClient::new();
    mock.set_response(STREAM_URL, response);
    mock
}

pub fn rag_client(mock: &MockHttpClient) -> RagClient {
    RagClient::with_http(ClientConfig::default(), Arc::new(mock.clone()))
}

pub fn controller(mock: &MockHttpClient) -> TurnController {
    TurnController::new(rag_client(mock))
}

/// Records observer callbacks as short strings.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl TurnObserver for RecordingObserver {
    fn on_phase(&self, phase: TurnPhase) {
        self.record(format!("phase:{}", phase));
    }

    fn on_token(&self, _message_id: MessageId, delta: &str) {
        self.record(format!("token:{}", delta));
    }

    fn on_sources(&self, _message_id: MessageId, sources: &[Source]) {
        self.record(format!("sources:{}", sources.len()));
    }

    fn on_metadata(&self, _message_id: MessageId, metrics: &ResponseMetrics) {
        self.record(format!("metadata:{}", metrics.confidence_percent()));
    }

    fn on_error(&self, message: &str) {
        self.record(format!("error:{}", message));
    }

    fn on_finalized(&self, message: &Message) {
        self.record(format!("finalized:{}", message.content));
    }
}
