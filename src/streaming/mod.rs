//! SSE (Server-Sent Events) streaming utilities
//!
//! Line buffering for reading the provider's SSE stream, the event type the
//! relay writes to clients, and the relay loop itself.

pub mod relay;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub use relay::{relay_chunks, RelayOutcome};

/// Buffer for accumulating incomplete SSE lines across chunk boundaries.
///
/// Provider bytes arrive in network-sized pieces that rarely align with
/// line boundaries. Complete lines are handed out as soon as their `\n`
/// arrives; a trailing `\r` is stripped so CRLF framing reads the same as LF.
///
/// # Example
/// ```
/// use chat_relay::streaming::SseLineBuffer;
///
/// let mut buffer = SseLineBuffer::new();
///
/// let lines = buffer.feed(b"data: {\"candidates\":[]");
/// assert!(lines.is_empty());
///
/// let lines = buffer.feed(b"}\r\n\r\n");
/// assert_eq!(lines, vec!["data: {\"candidates\":[]}"]);
/// ```
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    incomplete: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self {
            incomplete: Vec::new(),
        }
    }

    /// Feed bytes into the buffer and return any complete, non-empty lines.
    ///
    /// Lines are decoded only once complete, so a multi-byte character split
    /// across two reads comes out intact.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.incomplete.extend_from_slice(bytes);

        let mut complete_lines = Vec::new();
        while let Some(newline_pos) = self.incomplete.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.incomplete.drain(..=newline_pos).collect();

            // Blank lines only separate events
            if let Some(line) = decode_line(&line) {
                complete_lines.push(line);
            }
        }

        complete_lines
    }

    pub fn has_incomplete(&self) -> bool {
        self.incomplete.iter().any(|b| !b.is_ascii_whitespace())
    }

    /// Take whatever is left once the byte stream has ended.
    ///
    /// Some servers close the stream without a final newline.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.incomplete);
        decode_line(&rest).filter(|line| !line.trim().is_empty())
    }
}

/// Decode one line without its `\r\n` terminator, `None` when blank.
fn decode_line(line: &[u8]) -> Option<String> {
    let end = line
        .iter()
        .rposition(|&b| b != b'\n' && b != b'\r')
        .map_or(0, |pos| pos + 1);

    (end > 0).then(|| String::from_utf8_lossy(&line[..end]).into_owned())
}

/// Payload of an SSE `data:` line, `None` for comments and other fields.
pub fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim)
}

/// Event written to the client stream
///
/// Zero or more `Token` events are followed by exactly one `Done` or
/// `Error` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamEvent {
    Token {
        token: String,
        /// Unix time in milliseconds
        timestamp: i64,
    },
    Done {
        done: bool,
    },
    Error {
        error: bool,
        message: String,
    },
}

impl StreamEvent {
    pub fn token(token: impl Into<String>) -> Self {
        StreamEvent::Token {
            token: token.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn done() -> Self {
        StreamEvent::Done { done: true }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error {
            error: true,
            message: message.into(),
        }
    }

    /// Whether this event ends the stream
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Token { .. })
    }
}

/// Format an event as an SSE data frame: `data: {json}\n\n`
pub fn format_sse_event(event: &StreamEvent) -> Bytes {
    let json = serde_json::to_string(event).expect("StreamEvent should always serialize");
    Bytes::from(format!("data: {}\n\n", json))
}
