//! Error handling for the client.
//!
//! - **Error Categories**: high-level classification for handling decisions
//! - **Domain-specific Errors**: network, stream, conversation store and config
//! - **Unified Error Type**: `RagError` consolidates them, `RagResult<T>` aliases it
//!
//! | Category | Meaning | Retry? |
//! |---|---|---|
//! | Network | Connection, timeout, dropped stream | Yes |
//! | Auth | Token rejected (401/403) | No |
//! | Server | Backend errors (5xx, error events) | Yes |
//! | Client | Protocol mismatch, store misuse | No |
//! | User | Cancelled turns | No |
//! | Configuration | Bad URL or timeout | No |

mod category;
mod config;
mod conversation;
mod network;
mod rag_error;
mod stream;

pub use category::ErrorCategory;
pub use config::ConfigError;
pub use conversation::ConversationError;
pub use network::NetworkError;
pub use rag_error::{RagError, RagResult};
pub use stream::StreamError;
