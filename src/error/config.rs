//! Configuration errors.

use thiserror::Error;

/// Invalid client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("server URL is empty")]
    EmptyBaseUrl,

    #[error("server URL '{0}' must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("timeout '{0}' is not a whole number of seconds")]
    InvalidTimeout(String),
}
