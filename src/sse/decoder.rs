//! Frame decoding for the answer stream.
//!
//! Turns raw transport chunks into `data:` payloads. Chunk boundaries are
//! arbitrary: a line or a multibyte character may be split across chunks,
//! so both the undecoded byte tail and the unterminated line are carried
//! forward to the next chunk.

use std::borrow::Cow;

/// Prefix that marks a line as carrying a payload.
pub const DATA_PREFIX: &str = "data:";

/// Payload that marks the end of the answer by convention.
pub const DONE_MARKER: &str = "[DONE]";

/// One decoded line of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Payload text with the `data:` prefix stripped
    Payload(String),
    /// The `[DONE]` marker
    Done,
}

/// Stateful, line-oriented decoder for `data:` framed streams.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes of an incomplete UTF-8 sequence at the end of the last chunk
    pending_bytes: Vec<u8>,
    /// Decoded text not yet terminated by a newline
    line_buffer: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning every frame it completes.
    ///
    /// Invalid UTF-8 is replaced with U+FFFD. A multibyte character split at
    /// the end of the chunk is held back until the next chunk completes it.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> Vec<Frame> {
        let scanned = self.line_buffer.len();
        self.decode_utf8(chunk);
        self.drain_lines(scanned)
    }

    /// Feed a chunk of already-decoded text.
    pub fn push_str(&mut self, chunk: &str) -> Vec<Frame> {
        self.push_bytes(chunk.as_bytes())
    }

    /// Flush the decoder at end-of-stream.
    ///
    /// A trailing line without a newline is still decoded; a dangling
    /// partial character becomes U+FFFD.
    pub fn finish(&mut self) -> Vec<Frame> {
        if !self.pending_bytes.is_empty() {
            self.pending_bytes.clear();
            self.line_buffer.push(char::REPLACEMENT_CHARACTER);
        }
        let rest = std::mem::take(&mut self.line_buffer);
        parse_line(&rest).into_iter().collect()
    }

    /// True if bytes or text are buffered waiting for more input.
    pub fn has_pending(&self) -> bool {
        !self.pending_bytes.is_empty() || !self.line_buffer.is_empty()
    }

    fn decode_utf8(&mut self, chunk: &[u8]) {
        let bytes: Cow<'_, [u8]> = if self.pending_bytes.is_empty() {
            Cow::Borrowed(chunk)
        } else {
            let mut joined = std::mem::take(&mut self.pending_bytes);
            joined.extend_from_slice(chunk);
            Cow::Owned(joined)
        };

        let mut rest: &[u8] = &bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.line_buffer.push_str(text);
                    return;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    self.line_buffer
                        .push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match err.error_len() {
                        Some(len) => {
                            self.line_buffer.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid + len..];
                        }
                        None => {
                            // Incomplete sequence at the end of the chunk
                            self.pending_bytes.extend_from_slice(&rest[valid..]);
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Split off every complete line. `line_buffer[..scanned]` is known to
    /// hold no newline, so only the freshly decoded text is searched.
    fn drain_lines(&mut self, scanned: usize) -> Vec<Frame> {
        let Some(last_newline) = self.line_buffer[scanned..]
            .rfind('\n')
            .map(|offset| scanned + offset)
        else {
            return Vec::new();
        };
        let tail = self.line_buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.line_buffer, tail);
        complete.lines().filter_map(parse_line).collect()
    }
}

/// Decode a single line into a frame.
///
/// Blank lines, comments and lines without the `data:` prefix yield `None`.
/// One optional space after the colon is stripped.
pub fn parse_line(line: &str) -> Option<Frame> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    let rest = line.strip_prefix(DATA_PREFIX)?;
    let payload = rest.strip_prefix(' ').unwrap_or(rest);

    if payload.trim().is_empty() {
        return None;
    }
    if payload.trim() == DONE_MARKER {
        return Some(Frame::Done);
    }
    Some(Frame::Payload(payload.to_string()))
}
