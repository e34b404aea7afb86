//! Coarse error classes used to decide how a failure is reported.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection trouble, timeouts, a stream cut short
    Network,
    /// Credentials rejected with 401 or 403
    Auth,
    /// 5xx responses and backend `error` events
    Server,
    /// Protocol mismatches and store misuse; usually a bug
    Client,
    /// The user cancelled
    User,
    /// Unusable URL or timeout settings
    Configuration,
}

impl ErrorCategory {
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Lowercase label for log fields.
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::User => "user",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// One-line suggestion printed next to the error.
    pub fn recovery_hint(self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the backend is running and reachable, then ask again.",
            ErrorCategory::Auth => "Pass a valid token with --token or RAGSTREAM_TOKEN.",
            ErrorCategory::Server => "The backend is having trouble; try again in a moment.",
            ErrorCategory::Client => "If this keeps happening, please report it.",
            ErrorCategory::User => "Ask again when ready.",
            ErrorCategory::Configuration => "Check RAGSTREAM_URL and RAGSTREAM_TIMEOUT_SECS.",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
