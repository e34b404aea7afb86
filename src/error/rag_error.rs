//! The unified error type.

use std::fmt;

use super::{ConfigError, ConversationError, ErrorCategory, NetworkError, StreamError};
use crate::traits::HttpError;

/// Every failure the client can surface, grouped by where it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum RagError {
    Network(NetworkError),
    Stream(StreamError),
    Conversation(ConversationError),
    Config(ConfigError),
}

impl RagError {
    /// Get the error category for handling decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            RagError::Network(e) if e.is_auth_failure() => ErrorCategory::Auth,
            RagError::Network(NetworkError::Status { status, .. }) if *status >= 500 => {
                ErrorCategory::Server
            }
            RagError::Network(NetworkError::Status { .. }) => ErrorCategory::Client,
            RagError::Network(NetworkError::BadUrl { .. }) => ErrorCategory::Configuration,
            RagError::Network(_) => ErrorCategory::Network,
            RagError::Stream(StreamError::BackendError { .. }) => ErrorCategory::Server,
            RagError::Stream(StreamError::InvalidPayload { .. }) => ErrorCategory::Client,
            RagError::Stream(StreamError::Cancelled) => ErrorCategory::User,
            RagError::Stream(StreamError::ConnectionLost { .. }) => ErrorCategory::Network,
            RagError::Conversation(_) => ErrorCategory::Client,
            RagError::Config(_) => ErrorCategory::Configuration,
        }
    }

    /// Check if the error is likely transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            RagError::Network(e) => e.is_retryable(),
            RagError::Stream(e) => e.is_retryable(),
            RagError::Conversation(_) | RagError::Config(_) => false,
        }
    }

    /// Text suitable for the conversation's error slot.
    pub fn user_message(&self) -> String {
        match self {
            RagError::Network(e) => e.user_message(),
            RagError::Stream(e) => e.user_message(),
            RagError::Conversation(_) => {
                "Sorry, there was an error processing your request.".to_string()
            }
            RagError::Config(e) => e.to_string(),
        }
    }

    /// Stable code for log lines, e.g. `E_NET_CONN`.
    pub fn error_code(&self) -> &'static str {
        match self {
            RagError::Network(e) => e.error_code(),
            RagError::Stream(e) => e.error_code(),
            RagError::Conversation(ConversationError::StreamAlreadyActive { .. }) => "E_CONV_BUSY",
            RagError::Conversation(ConversationError::MessageNotFound { .. }) => "E_CONV_NOTFOUND",
            RagError::Conversation(ConversationError::MessageFinalized { .. }) => "E_CONV_FINAL",
            RagError::Config(_) => "E_CONFIG",
        }
    }

    /// Get the recovery hint from the category.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for RagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RagError::Network(e) => write!(f, "{}", e),
            RagError::Stream(e) => write!(f, "{}", e),
            RagError::Conversation(e) => write!(f, "{}", e),
            RagError::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RagError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RagError::Network(e) => Some(e),
            RagError::Stream(e) => Some(e),
            RagError::Conversation(e) => Some(e),
            RagError::Config(e) => Some(e),
        }
    }
}

impl From<NetworkError> for RagError {
    fn from(err: NetworkError) -> Self {
        RagError::Network(err)
    }
}

impl From<StreamError> for RagError {
    fn from(err: StreamError) -> Self {
        RagError::Stream(err)
    }
}

impl From<ConversationError> for RagError {
    fn from(err: ConversationError) -> Self {
        RagError::Conversation(err)
    }
}

impl From<ConfigError> for RagError {
    fn from(err: ConfigError) -> Self {
        RagError::Config(err)
    }
}

impl From<HttpError> for RagError {
    fn from(err: HttpError) -> Self {
        RagError::Network(err.into())
    }
}

impl From<serde_json::Error> for RagError {
    fn from(err: serde_json::Error) -> Self {
        RagError::Network(NetworkError::BadResponse {
            message: err.to_string(),
        })
    }
}

/// Type alias for Results using RagError.
pub type RagResult<T> = Result<T, RagError>;
