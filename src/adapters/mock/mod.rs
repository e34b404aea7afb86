//! Test doubles for the transport seam.

pub mod http;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
