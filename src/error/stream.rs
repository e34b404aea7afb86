//! Failures after the answer stream has opened.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    /// The transport broke while the answer was arriving
    #[error("answer stream interrupted: {message}")]
    ConnectionLost { message: String },

    /// A payload did not match the shape its event type requires
    #[error("bad {event_type} payload: {message}")]
    InvalidPayload { event_type: String, message: String },

    /// An `error` event sent by the backend
    #[error("backend reported: {message}")]
    BackendError { message: String },

    #[error("answer cancelled")]
    Cancelled,
}

impl StreamError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StreamError::ConnectionLost { .. })
    }

    /// Text for the conversation's error slot. Backend-reported errors are
    /// shown as sent.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::ConnectionLost { .. } => {
                "The connection was lost while the answer was streaming. Please try again."
                    .to_string()
            }
            StreamError::InvalidPayload { event_type, .. } => {
                format!("Failed to process server message ({}).", event_type)
            }
            StreamError::BackendError { message } => message.clone(),
            StreamError::Cancelled => "The answer was cancelled.".to_string(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ConnectionLost { .. } => "E_STREAM_CONN",
            StreamError::InvalidPayload { .. } => "E_STREAM_PAYLOAD",
            StreamError::BackendError { .. } => "E_STREAM_BACKEND",
            StreamError::Cancelled => "E_STREAM_CANCEL",
        }
    }
}
