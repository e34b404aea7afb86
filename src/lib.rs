//! ragstream - a streaming client for retrieval-augmented question answering
//!
//! The engine turns the backend's incrementally delivered answer stream into
//! an ordered conversation: [`sse`] decodes and parses events,
//! [`conversation`] holds the message log and [`turn`] drives each query.
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod models;
pub mod sse;
pub mod traits;
pub mod turn;
