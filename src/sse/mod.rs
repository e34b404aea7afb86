//! Answer stream decoding.
//!
//! The backend streams newline-delimited lines of the form
//! `data: {"type": "token" | "sources" | "metadata" | "error", "data": ...}`
//! terminated by `data: [DONE]`.
//!
//! # Module structure
//! - `decoder` - chunk-to-frame decoding (`FrameDecoder`, `Frame`)
//! - `events` - event types (`StreamEvent`, `SseParseError`)
//! - `payloads` - internal payload deserialization structs
//! - `parser` - payload-to-event parsing (`parse_payload`, `EventParser`)
//! - `stream` - the two wired over a byte stream (`event_stream`)

mod decoder;
mod events;
mod parser;
mod payloads;
mod stream;

pub use decoder::{parse_line, Frame, FrameDecoder, DATA_PREFIX, DONE_MARKER};
pub use events::{SseParseError, StreamEvent};
pub use parser::{parse_payload, EventParser};
pub use stream::{event_stream, EventStream};
