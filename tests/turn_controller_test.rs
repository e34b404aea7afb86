//! End-to-end turn tests over the mock transport.

mod common;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde_json::json;

use common::*;
use ragstream::adapters::mock::{MockHttpClient, MockResponse};
use ragstream::models::{MessageRole, Rating};
use ragstream::traits::{HttpError, Response};
use ragstream::turn::{RejectReason, TurnController, TurnOutcome, TurnPhase};

async fn wait_for_request(mock: &MockHttpClient, url: &str) -> bool {
    for _ in 0..100 {
        if mock.get_requests().iter().any(|r| r.url == url) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn test_tokens_are_concatenated_and_finalized() {
    let body = payload(&[token_line("Hel"), token_line("lo"), DONE_LINE.to_string()]);
    let mock = mock_with_stream(MockResponse::Stream(vec![Bytes::from(body)]));
    let controller = controller(&mock);

    let outcome = controller.submit("Say hello").await;
    let TurnOutcome::Completed { message_id } = outcome else {
        panic!("expected completion, got {:?}", outcome);
    };

    let conversation = controller.conversation();
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation.messages()[0].role, MessageRole::User);
    assert_eq!(conversation.messages()[0].content, "Say hello");

    let answer = conversation.get(message_id).unwrap();
    assert_eq!(answer.role, MessageRole::Assistant);
    assert_eq!(answer.content, "Hello");
    assert!(!answer.streaming);

    let view = controller.view();
    assert_eq!(view.phase, TurnPhase::Idle);
    assert!(!view.loading);
    assert!(view.error.is_none());
    assert_eq!(mock.open_stream_count(), 0);
}

#[tokio::test]
async fn test_sources_only_answer() {
    let body = payload(&[
        event_line("sources", json!([{"title": "A", "similarity": 0.9}])),
        DONE_LINE.to_string(),
    ]);
    let mock = mock_with_stream(MockResponse::Stream(vec![Bytes::from(body)]));
    let controller = controller(&mock);

    let id = controller.submit("q").await.message_id().unwrap();
    let conversation = controller.conversation();
    let answer = conversation.get(id).unwrap();
    assert_eq!(answer.content, "");
    assert_eq!(answer.sources.len(), 1);
    assert_eq!(answer.sources[0].similarity, 0.9);
    assert_eq!(answer.sources[0].display_title(), "A");
}

#[tokio::test]
async fn test_line_split_across_chunks() {
    let mock = mock_with_stream(MockResponse::Stream(vec![
        Bytes::from("data: {\"type\":\"tok"),
        Bytes::from("en\",\"data\":\"X\"}\n"),
        Bytes::from(DONE_LINE),
    ]));
    let controller = controller(&mock);

    let id = controller.submit("q").await.message_id().unwrap();
    assert_eq!(controller.conversation().get(id).unwrap().content, "X");
}

#[tokio::test]
async fn test_backend_error_keeps_streaming() {
    let body = payload(&[
        token_line("Partial"),
        error_line("Retriever timed out"),
        token_line(" answer"),
        token_line(" continues"),
        DONE_LINE.to_string(),
    ]);
    let mock = mock_with_stream(MockResponse::Stream(vec![Bytes::from(body)]));
    let controller = controller(&mock);

    let outcome = controller.submit("q").await;
    assert!(outcome.is_completed());

    let id = outcome.message_id().unwrap();
    assert_eq!(
        controller.conversation().get(id).unwrap().content,
        "Partial answer continues"
    );
    assert_eq!(controller.view().error.as_deref(), Some("Retriever timed out"));
}

#[tokio::test]
async fn test_answer_is_identical_for_every_split_point() {
    let bytes = payload(&[
        token_line("Größe "),
        token_line("日本語"),
        event_line("sources", json!([{"title": "A", "similarity": 0.5}])),
        token_line(" ✓"),
        DONE_LINE.to_string(),
    ]);

    for at in 0..=bytes.len() {
        let mock = mock_with_stream(MockResponse::Stream(split_at(&bytes, at)));
        let controller = controller(&mock);

        let id = controller.submit("q").await.message_id().unwrap();
        let conversation = controller.conversation();
        let answer = conversation.get(id).unwrap();
        assert_eq!(answer.content, "Größe 日本語 ✓", "split at byte {}", at);
        assert_eq!(answer.sources.len(), 1, "split at byte {}", at);
        assert!(!answer.streaming);
    }
}

#[tokio::test]
async fn test_answer_is_identical_for_small_chunk_sizes() {
    let bytes = payload(&[
        token_line("naïve "),
        token_line("café"),
        DONE_LINE.to_string(),
    ]);

    for size in 1..=8 {
        let mock = mock_with_stream(MockResponse::Stream(chunks_of(&bytes, size)));
        let controller = controller(&mock);

        let id = controller.submit("q").await.message_id().unwrap();
        assert_eq!(
            controller.conversation().get(id).unwrap().content,
            "naïve café",
            "chunk size {}",
            size
        );
    }
}

#[tokio::test]
async fn test_malformed_payload_is_skipped() {
    let body = [
        token_line("a"),
        "data: {\"type\":\"token\",\"data\":\n".to_string(),
        "data: not json at all\n".to_string(),
        event_line("sources", json!("not a list")),
        token_line("b"),
        DONE_LINE.to_string(),
    ]
    .concat();
    let mock = mock_with_stream(MockResponse::Stream(vec![Bytes::from(body)]));
    let controller = controller(&mock);

    let outcome = controller.submit("q").await;
    assert!(outcome.is_completed());
    let id = outcome.message_id().unwrap();
    assert_eq!(controller.conversation().get(id).unwrap().content, "ab");
    assert!(controller.view().error.is_none());
}

#[tokio::test]
async fn test_metadata_is_bounded() {
    let body = payload(&[
        token_line("x"),
        event_line(
            "metadata",
            json!({"confidence_score": 1.5, "response_time": -20, "sources_count": 4}),
        ),
        DONE_LINE.to_string(),
    ]);
    let mock = mock_with_stream(MockResponse::Stream(vec![Bytes::from(body)]));
    let controller = controller(&mock);

    let id = controller.submit("q").await.message_id().unwrap();
    let conversation = controller.conversation();
    let metrics = conversation.get(id).unwrap().metadata.clone().unwrap();
    assert_eq!(metrics.confidence, 1.0);
    assert_eq!(metrics.latency_ms, 0.0);
    assert_eq!(metrics.citations.count, 4);
    assert!(metrics.citations.present);
}

#[tokio::test]
async fn test_rejected_request_creates_no_placeholder() {
    let mock = mock_with_stream(MockResponse::Error(HttpError::Status {
        status: 500,
        body: "internal".to_string(),
    }));
    let controller = controller(&mock);

    let outcome = controller.submit("q").await;
    let TurnOutcome::Failed { message_id, error } = outcome else {
        panic!("expected failure, got {:?}", outcome);
    };
    assert!(message_id.is_none());
    assert!(!error.is_empty());

    let conversation = controller.conversation();
    assert_eq!(conversation.len(), 1);
    assert_eq!(conversation.messages()[0].role, MessageRole::User);

    let view = controller.view();
    assert_eq!(view.phase, TurnPhase::Idle);
    assert!(!view.loading);
    assert_eq!(view.error, Some(error));
    assert_eq!(mock.open_stream_count(), 0);
}

#[tokio::test]
async fn test_mid_stream_failure_finalizes_message() {
    let body = payload(&[token_line("Half an ")]);
    let mock = mock_with_stream(MockResponse::StreamThenError(
        vec![Bytes::from(body)],
        HttpError::Body("connection reset by peer".to_string()),
    ));
    let controller = controller(&mock);

    let outcome = controller.submit("q").await;
    let TurnOutcome::Failed { message_id, .. } = outcome else {
        panic!("expected failure, got {:?}", outcome);
    };

    let conversation = controller.conversation();
    let answer = conversation.get(message_id.unwrap()).unwrap();
    assert_eq!(answer.content, "Half an ");
    assert!(!answer.streaming);
    assert_eq!(conversation.streaming_count(), 0);
    assert!(controller.view().error.is_some());
    assert_eq!(controller.phase(), TurnPhase::Idle);
    assert_eq!(mock.open_stream_count(), 0);
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let mock = MockHttpClient::new();
    let controller = controller(&mock);

    assert_eq!(
        controller.submit("   ").await,
        TurnOutcome::Rejected(RejectReason::EmptyQuery)
    );
    assert!(controller.conversation().is_empty());
    assert!(mock.get_requests().is_empty());
}

#[tokio::test]
async fn test_busy_rejection_and_cancel() {
    let mock = mock_with_stream(MockResponse::StreamThenHang(vec![Bytes::from(token_line(
        "thinking",
    ))]));
    let controller = controller(&mock);
    let mut views = controller.subscribe();

    let running = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit("first").await }
    });
    views
        .wait_for(|v| {
            v.phase == TurnPhase::Streaming
                && v.conversation.last().map(|m| m.content.as_str()) == Some("thinking")
        })
        .await
        .unwrap();

    assert_eq!(
        controller.submit("second").await,
        TurnOutcome::Rejected(RejectReason::Busy)
    );
    assert_eq!(controller.conversation().len(), 2);
    assert_eq!(mock.open_stream_count(), 1);

    assert!(controller.cancel_handle().cancel());
    let outcome = running.await.unwrap();
    let TurnOutcome::Failed { message_id, .. } = outcome else {
        panic!("expected cancellation failure, got {:?}", outcome);
    };

    let conversation = controller.conversation();
    let answer = conversation.get(message_id.unwrap()).unwrap();
    assert_eq!(answer.content, "thinking");
    assert!(!answer.streaming);
    assert_eq!(controller.phase(), TurnPhase::Idle);
    assert!(!controller.cancel_handle().is_active());
    assert_eq!(mock.open_stream_count(), 0);
}

#[tokio::test]
async fn test_dropped_submit_finalizes_turn() {
    let mock = mock_with_stream(MockResponse::StreamThenHang(vec![Bytes::from(token_line(
        "partial",
    ))]));
    let controller = controller(&mock);

    let timed_out = tokio::time::timeout(Duration::from_millis(50), controller.submit("q")).await;
    assert!(timed_out.is_err());

    let conversation = controller.conversation();
    assert_eq!(conversation.streaming_count(), 0);
    assert_eq!(conversation.last().unwrap().content, "partial");
    assert_eq!(controller.phase(), TurnPhase::Idle);
    assert!(!controller.view().loading);
    assert_eq!(mock.open_stream_count(), 0);

    mock.set_response(
        STREAM_URL,
        MockResponse::Stream(vec![Bytes::from(token_line("next"))]),
    );
    assert!(controller.submit("again").await.is_completed());
}

#[tokio::test]
async fn test_cancel_while_opening_stream() {
    let mock = mock_with_stream(MockResponse::Hang);
    let controller = controller(&mock);
    let mut views = controller.subscribe();

    let running = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit("slow backend").await }
    });
    views
        .wait_for(|v| v.phase == TurnPhase::Submitting)
        .await
        .unwrap();
    assert!(wait_for_request(&mock, STREAM_URL).await);

    assert!(controller.cancel_handle().cancel());
    assert_eq!(
        running.await.unwrap(),
        TurnOutcome::Failed {
            message_id: None,
            error: "The answer was cancelled.".to_string(),
        }
    );

    let view = controller.view();
    assert_eq!(view.phase, TurnPhase::Idle);
    assert!(!view.loading);
    assert_eq!(view.error.as_deref(), Some("The answer was cancelled."));
    assert_eq!(view.conversation.len(), 1);
    assert_eq!(view.conversation.last().unwrap().role, MessageRole::User);
    assert_eq!(mock.open_stream_count(), 0);
}

#[tokio::test]
async fn test_dropped_submit_while_opening_stream() {
    let mock = mock_with_stream(MockResponse::Hang);
    let controller = controller(&mock);

    let timed_out = tokio::time::timeout(Duration::from_millis(50), controller.submit("q")).await;
    assert!(timed_out.is_err());

    let view = controller.view();
    assert_eq!(view.phase, TurnPhase::Idle);
    assert!(!view.loading);
    assert!(view.error.is_none());
    assert_eq!(view.conversation.len(), 1);
    assert_eq!(view.conversation.streaming_count(), 0);
    assert!(!controller.cancel_handle().is_active());

    mock.set_response(
        STREAM_URL,
        MockResponse::Stream(vec![Bytes::from(token_line("finally"))]),
    );
    assert!(controller.submit("again").await.is_completed());
    assert_eq!(controller.conversation().last().unwrap().content, "finally");
}

#[tokio::test]
async fn test_error_is_cleared_by_next_turn() {
    let mock = mock_with_stream(MockResponse::Error(HttpError::Connect(
        "refused".to_string(),
    )));
    let controller = controller(&mock);
    controller.submit("q").await;
    assert!(controller.view().has_error());

    mock.set_response(
        STREAM_URL,
        MockResponse::Stream(vec![Bytes::from(token_line("ok"))]),
    );
    assert!(controller.submit("q").await.is_completed());
    assert!(controller.view().error.is_none());
}

#[tokio::test]
async fn test_observer_sees_lifecycle_in_order() {
    let body = payload(&[
        token_line("Hi"),
        event_line("sources", json!([{"content": "c", "similarity": 0.3}])),
        event_line("metadata", json!({"confidence": 0.75})),
        DONE_LINE.to_string(),
    ]);
    let mock = mock_with_stream(MockResponse::Stream(vec![Bytes::from(body)]));
    let observer = Arc::new(RecordingObserver::default());
    let controller = TurnController::with_observer(rag_client(&mock), observer.clone());

    controller.submit("q").await;

    assert_eq!(
        observer.events(),
        vec![
            "phase:submitting",
            "phase:streaming",
            "token:Hi",
            "sources:1",
            "metadata:75",
            "phase:finalizing",
            "finalized:Hi",
            "phase:idle",
        ]
    );
}

#[tokio::test]
async fn test_feedback_targets_last_query() {
    let body = payload(&[
        token_line("answer"),
        event_line("metadata", json!({"query_id": "query_1700000000.0", "confidence": 0.9})),
        DONE_LINE.to_string(),
    ]);
    let mock = mock_with_stream(MockResponse::Stream(vec![Bytes::from(body)]));
    mock.set_response(
        FEEDBACK_URL,
        MockResponse::Success(Response::new(200, Bytes::from("{}"))),
    );
    let controller = controller(&mock);

    assert!(!controller.send_feedback(Rating::Positive, true, None));

    controller.submit("q").await;
    assert_eq!(
        controller.last_query_id().as_deref(),
        Some("query_1700000000.0")
    );
    assert!(controller.send_feedback(Rating::Negative, false, Some("off topic".to_string())));
    assert!(wait_for_request(&mock, FEEDBACK_URL).await);

    let request = mock
        .get_requests()
        .into_iter()
        .find(|r| r.url == FEEDBACK_URL)
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(
        body,
        json!({
            "query_id": "query_1700000000.0",
            "rating": 1,
            "helpful": false,
            "feedback_text": "off topic"
        })
    );
}

#[tokio::test]
async fn test_feedback_failure_is_not_surfaced() {
    let body = payload(&[event_line("metadata", json!({"query_id": "q-9"}))]);
    let mock = mock_with_stream(MockResponse::Stream(vec![Bytes::from(body)]));
    mock.set_response(
        FEEDBACK_URL,
        MockResponse::Error(HttpError::Status {
            status: 500,
            body: "storage down".to_string(),
        }),
    );
    let controller = controller(&mock);

    controller.submit("q").await;
    assert!(controller.send_feedback(Rating::Positive, true, None));
    assert!(wait_for_request(&mock, FEEDBACK_URL).await);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(controller.view().error.is_none());
}
