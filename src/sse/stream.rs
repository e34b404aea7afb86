//! Decoder and parser wired over a byte stream.

use std::collections::VecDeque;
use std::pin::Pin;

use futures::stream::{self, Stream, StreamExt};
use tracing::debug;

use crate::sse::decoder::{Frame, FrameDecoder};
use crate::sse::events::StreamEvent;
use crate::sse::parser::EventParser;
use crate::traits::{ByteStream, HttpError};

/// Lazy, ordered sequence of events for one turn.
///
/// Ends when the transport reports end-of-stream. A transport failure is
/// yielded once as `Err` and ends the sequence.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, HttpError>> + Send>>;

struct Pipeline {
    body: ByteStream,
    decoder: FrameDecoder,
    parser: EventParser,
    ready: VecDeque<StreamEvent>,
    exhausted: bool,
}

impl Pipeline {
    fn enqueue(&mut self, frames: Vec<Frame>) {
        for frame in frames {
            if let Some(event) = self.parser.parse(frame) {
                self.ready.push_back(event);
            }
        }
    }
}

/// Turn a response body into typed events.
pub fn event_stream(body: ByteStream) -> EventStream {
    let pipeline = Pipeline {
        body,
        decoder: FrameDecoder::new(),
        parser: EventParser::new(),
        ready: VecDeque::new(),
        exhausted: false,
    };

    Box::pin(stream::unfold(pipeline, |mut pipeline| async move {
        loop {
            if let Some(event) = pipeline.ready.pop_front() {
                return Some((Ok(event), pipeline));
            }
            if pipeline.exhausted {
                return None;
            }

            match pipeline.body.next().await {
                Some(Ok(chunk)) => {
                    let frames = pipeline.decoder.push_bytes(&chunk);
                    pipeline.enqueue(frames);
                }
                Some(Err(e)) => {
                    pipeline.exhausted = true;
                    return Some((Err(e), pipeline));
                }
                None => {
                    pipeline.exhausted = true;
                    let frames = pipeline.decoder.finish();
                    pipeline.enqueue(frames);
                    debug!(
                        "Answer stream ended ({} malformed payloads skipped)",
                        pipeline.parser.skipped()
                    );
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn body(chunks: Vec<Result<Bytes, HttpError>>) -> ByteStream {
        Box::pin(stream::iter(chunks))
    }

    async fn collect(chunks: Vec<Result<Bytes, HttpError>>) -> Vec<Result<StreamEvent, HttpError>> {
        event_stream(body(chunks)).collect().await
    }

    fn token(delta: &str) -> Result<StreamEvent, HttpError> {
        Ok(StreamEvent::Token {
            delta: delta.to_string(),
        })
    }

    #[tokio::test]
    async fn test_events_in_order() {
        let events = collect(vec![
            Ok(Bytes::from("data: {\"type\":\"token\",\"data\":\"Hel\"}\n")),
            Ok(Bytes::from("data: {\"type\":\"token\",\"data\":\"lo\"}\ndata: [DONE]\n")),
        ])
        .await;
        assert_eq!(events, vec![token("Hel"), token("lo"), Ok(StreamEvent::Done)]);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_skipped() {
        let events = collect(vec![Ok(Bytes::from(
            "data: {\"type\":\"token\",\"data\":\"a\"}\ndata: {broken\ndata: {\"type\":\"token\",\"data\":\"b\"}\n",
        ))])
        .await;
        assert_eq!(events, vec![token("a"), token("b")]);
    }

    #[tokio::test]
    async fn test_unterminated_last_line_is_flushed() {
        let events = collect(vec![Ok(Bytes::from(
            "data: {\"type\":\"token\",\"data\":\"end\"}",
        ))])
        .await;
        assert_eq!(events, vec![token("end")]);
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let events = collect(vec![
            Ok(Bytes::from("data: {\"type\":\"token\",\"data\":\"a\"}\n")),
            Err(HttpError::Body("connection reset".to_string())),
            Ok(Bytes::from("data: {\"type\":\"token\",\"data\":\"never\"}\n")),
        ])
        .await;
        assert_eq!(
            events,
            vec![token("a"), Err(HttpError::Body("connection reset".to_string()))]
        );
    }
}
