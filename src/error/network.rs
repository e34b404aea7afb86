//! Failures talking to the backend before an answer starts streaming, and
//! on the plain request/response endpoints.

use thiserror::Error;

use crate::traits::HttpError;

const GENERIC_FAILURE: &str = "Sorry, there was an error processing your request.";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error("cannot reach {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("request to {url} timed out: {message}")]
    TimedOut { url: String, message: String },

    /// The backend answered with a non-2xx status
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A 2xx body that could not be decoded
    #[error("unreadable response: {message}")]
    BadResponse { message: String },

    #[error("malformed request URL {url}")]
    BadUrl { url: String },

    #[error("transport error: {message}")]
    Transport { message: String },
}

impl NetworkError {
    /// Attach the request URL to a transport failure.
    pub fn from_http(err: HttpError, url: &str) -> Self {
        let url = url.to_string();
        match err {
            HttpError::Connect(message) => NetworkError::Unreachable { url, message },
            HttpError::Timeout(message) => NetworkError::TimedOut { url, message },
            HttpError::Status { status, body } => NetworkError::Status { status, body },
            HttpError::InvalidUrl(_) => NetworkError::BadUrl { url },
            HttpError::Body(message) | HttpError::Other(message) => {
                NetworkError::Transport { message }
            }
        }
    }

    /// Worth asking again: connection trouble, timeouts, overload and 5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::Unreachable { .. } | NetworkError::TimedOut { .. } => true,
            NetworkError::Status { status, .. } => matches!(*status, 408 | 429 | 500..=599),
            _ => false,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, NetworkError::Status { status: 401 | 403, .. })
    }

    /// Text for the conversation's error slot. Server bodies are never shown.
    pub fn user_message(&self) -> String {
        let text = match self {
            NetworkError::Unreachable { .. } => {
                "Unable to reach the server. Please check that it is running and try again."
            }
            NetworkError::TimedOut { .. } => "The server took too long to respond. Please try again.",
            NetworkError::Status { status, .. } => return status_message(*status),
            NetworkError::BadResponse { .. } => {
                "Received an invalid response from the server. Please try again."
            }
            NetworkError::BadUrl { url } => return format!("The server URL '{}' is not valid.", url),
            NetworkError::Transport { .. } => GENERIC_FAILURE,
        };
        text.to_string()
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::Unreachable { .. } => "E_NET_CONN",
            NetworkError::TimedOut { .. } => "E_NET_TIMEOUT",
            NetworkError::Status { .. } => "E_NET_HTTP",
            NetworkError::BadResponse { .. } => "E_NET_INVALID",
            NetworkError::BadUrl { .. } => "E_NET_URL",
            NetworkError::Transport { .. } => "E_NET_OTHER",
        }
    }
}

fn status_message(status: u16) -> String {
    let text = match status {
        400 | 422 => "The question could not be processed. Please rephrase it and try again.",
        401 => "Authentication required. Please check your API token.",
        403 => "Access denied. Your token does not allow this action.",
        404 => "The requested resource was not found.",
        429 => "Too many requests. Please wait a moment and try again.",
        500..=599 => GENERIC_FAILURE,
        _ => return format!("The server returned HTTP {}. Please try again.", status),
    };
    text.to_string()
}

impl From<HttpError> for NetworkError {
    fn from(err: HttpError) -> Self {
        NetworkError::from_http(err, "")
    }
}
