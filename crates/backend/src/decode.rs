//! Streaming event decoder for the agent server's wire protocol.
//!
//! The response body is framed as newline-delimited records; meaningful
//! records carry a `data:` marker followed by a JSON payload.  A record may
//! span multiple reads, so the decoder keeps a carry-over buffer: each
//! [`EventDecoder::feed`] drains complete lines and re-buffers the trailing
//! partial one, and [`EventDecoder::finish`] flushes the final unterminated
//! line when the connection closes.
//!
//! Malformed records are dropped silently and decoding continues — with one
//! exception: a record that parses to JSON and declares `type == "error"`
//! always surfaces as [`AgentEvent::Error`].  Framing noise is tolerated;
//! semantic failure signals are not swallowed.
//!
//! The decoder does not enforce terminal-event exclusivity (no events after
//! `done`/`error`) — that is the session driver's responsibility.

use hm_domain::event::AgentEvent;

/// Marker prefixing every meaningful record.
pub const DATA_MARKER: &str = "data:";

#[derive(Debug, Default)]
pub struct EventDecoder {
    buffer: String,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one read's worth of bytes and return the events completed
    /// by it, in arrival order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<AgentEvent> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            if let Some(event) = decode_record(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush the trailing partial line at stream close.
    pub fn finish(&mut self) -> Vec<AgentEvent> {
        if self.buffer.trim().is_empty() {
            self.buffer.clear();
            return Vec::new();
        }
        let line = std::mem::take(&mut self.buffer);
        decode_record(&line).into_iter().collect()
    }
}

/// Decode a single record: strip the marker, parse the JSON payload.
///
/// Returns `None` for non-record lines and for parse noise.
fn decode_record(line: &str) -> Option<AgentEvent> {
    let line = line.trim();
    let payload = line.strip_prefix(DATA_MARKER)?.trim();
    if payload.is_empty() {
        return None;
    }

    let value: serde_json::Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => {
            tracing::trace!(error = %e, "dropping malformed stream record");
            return None;
        }
    };

    // Semantic error records surface even when their shape is otherwise
    // unexpected (e.g. a non-string message).
    if value.get("type").and_then(|t| t.as_str()) == Some("error") {
        let message = match value.get("message") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        return Some(AgentEvent::Error { message });
    }

    match serde_json::from_value::<AgentEvent>(value) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::trace!(error = %e, "dropping unrecognized stream record");
            None
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
