//! Incremental decoder for `text/event-stream` bodies.
//!
//! Bytes arrive in arbitrary chunks; the decoder buffers partial lines and
//! yields the `data` payload of every complete event. Field names other
//! than `data` and comment lines (starting with `:`) are ignored.
//!
//! The bytes held for one unfinished event are capped; a server that never
//! terminates its lines fails the stream instead of growing the buffer.

use thiserror::Error;
use tracing::warn;

/// Upper bound on bytes buffered for a single event
pub const MAX_EVENT_BYTES: usize = 4 * 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Event stream message exceeds {limit} bytes")]
pub struct EventTooLarge {
    pub limit: usize,
}

#[derive(Debug)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data_lines: Vec<String>,
    data_len: usize,
    limit: usize,
    overflow: bool,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_limit(MAX_EVENT_BYTES)
    }
}

fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:")
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            data_lines: Vec::new(),
            data_len: 0,
            limit,
            overflow: false,
        }
    }

    /// Feed a chunk of bytes and return the payloads of events it completed.
    ///
    /// If the unfinished event grows past the limit its bytes are dropped
    /// and [`check_limit`](Self::check_limit) reports the overflow.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        if self.overflow {
            return Vec::new();
        }
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            let line = &line[..newline_pos];
            let line = line.strip_suffix(b"\r").unwrap_or(line);

            match std::str::from_utf8(line) {
                Ok(line) => {
                    if let Some(payload) = self.process_line(line) {
                        events.push(payload);
                    }
                }
                Err(e) => warn!("Invalid UTF-8 in event stream: {}", e),
            }
        }

        if self.buffer.len() + self.data_len > self.limit {
            self.buffer = Vec::new();
            self.data_lines.clear();
            self.data_len = 0;
            self.overflow = true;
        }
        events
    }

    pub fn check_limit(&self) -> Result<(), EventTooLarge> {
        if self.overflow {
            return Err(EventTooLarge { limit: self.limit });
        }
        Ok(())
    }

    /// Flush the final event when the body ends without a blank line.
    pub fn finish(&mut self) -> Option<String> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            match String::from_utf8(rest) {
                Ok(line) => {
                    let line = line.trim_end_matches('\r');
                    if let Some(payload) = self.process_line(line) {
                        return Some(payload);
                    }
                }
                Err(e) => warn!("Invalid UTF-8 in event stream: {}", e),
            }
        }
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        if let Some(payload) = data_payload(line) {
            self.data_len += payload.len() + 1;
            self.data_lines.push(payload.to_string());
        }
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        if self.data_lines.is_empty() {
            return None;
        }
        let payload = self.data_lines.join("\n");
        self.data_lines.clear();
        self.data_len = 0;
        Some(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_events_with_and_without_space_after_colon() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: {\"a\":1}\n\ndata:{\"b\":2}\n\n");
        assert_eq!(events, vec![r#"{"a":1}"#, r#"{"b":2}"#]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn buffers_events_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"da").is_empty());
        assert!(decoder.push(b"ta: hel").is_empty());
        assert!(decoder.push(b"lo\r\n").is_empty());
        assert_eq!(decoder.push(b"\r\n"), vec!["hello"]);
    }

    #[test]
    fn joins_multi_line_data_and_skips_comments() {
        let mut decoder = SseDecoder::new();
        let events = decoder
            .push(b": keep-alive\nevent: message\ndata: one\ndata: two\n\n");
        assert_eq!(events, vec!["one\ntwo"]);
    }

    #[test]
    fn finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish().as_deref(), Some("tail"));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn invalid_utf8_line_is_skipped() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: \xff\xfe\n\ndata: ok\n\n");
        assert_eq!(events, vec!["ok"]);
    }

    #[test]
    fn unterminated_line_over_limit_is_rejected() {
        let mut decoder = SseDecoder::with_limit(16);
        assert!(decoder.push(b"data: 0123456789").is_empty());
        assert_eq!(decoder.check_limit(), Ok(()));
        assert!(decoder.push(b"abcdef").is_empty());
        assert_eq!(decoder.check_limit(), Err(EventTooLarge { limit: 16 }));
        assert!(decoder.push(b"\n\n").is_empty());
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn many_data_lines_without_dispatch_are_rejected() {
        let mut decoder = SseDecoder::with_limit(16);
        assert!(decoder.push(b"data: 01234\n").is_empty());
        assert!(decoder.push(b"data: 56789\n").is_empty());
        assert!(decoder.push(b"data: abcde\n").is_empty());
        assert!(decoder.check_limit().is_err());
    }

    #[test]
    fn events_under_limit_keep_flowing() {
        let mut decoder = SseDecoder::with_limit(16);
        for _ in 0..100 {
            assert_eq!(decoder.push(b"data: 0123456789\n\n"), vec!["0123456789"]);
        }
        assert_eq!(decoder.check_limit(), Ok(()));
    }

    #[test]
    fn completed_events_survive_overflow_in_same_chunk() {
        let mut decoder = SseDecoder::with_limit(16);
        let events = decoder.push(b"data: ok\n\ndata: 0123456789abcdefghij");
        assert_eq!(events, vec!["ok"]);
        assert!(decoder.check_limit().is_err());
    }
}
