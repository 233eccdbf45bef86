//! Line framing for OpenWS messages.
//!
//! Stream transports carry newline-delimited JSON (NDJSON): one message per
//! line, `\n` terminated, UTF-8. The codec only frames; parsing the JSON is
//! left to [`RpcClient::handle`](openws_client::RpcClient::handle), which
//! tolerates garbage.

use openws_core::logging::{targets, warn};

/// Default maximum frame size (10 MiB).
pub const DEFAULT_MAX_FRAME: usize = 10 * 1024 * 1024;

/// Threshold for compacting the buffer.
const COMPACT_THRESHOLD: usize = 4096;

/// Splits a byte stream into text frames and frames outbound messages.
#[derive(Debug)]
pub struct LineCodec {
    /// Buffer for incomplete frames.
    buffer: Vec<u8>,
    /// Read position in buffer (data before this has been consumed).
    read_pos: usize,
    /// Maximum allowed frame size in bytes.
    max_frame: usize,
    /// Dropping input until the end of an oversized line.
    discarding: bool,
    /// Oversized lines dropped so far.
    skipped: u64,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCodec {
    /// Creates a codec with the default frame limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_frame(DEFAULT_MAX_FRAME)
    }

    /// Creates a codec with a custom frame limit.
    #[must_use]
    pub fn with_max_frame(max_frame: usize) -> Self {
        Self {
            buffer: Vec::new(),
            read_pos: 0,
            max_frame,
            discarding: false,
            skipped: 0,
        }
    }

    /// Returns the maximum allowed frame size in bytes.
    #[must_use]
    pub fn max_frame(&self) -> usize {
        self.max_frame
    }

    /// Number of oversized lines dropped since creation.
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Frames one outbound message.
    ///
    /// Serialized JSON never contains a raw newline, so the message is
    /// written as-is followed by `\n`.
    #[must_use]
    pub fn encode(&self, message: &str) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(message.len() + 1);
        bytes.extend_from_slice(message.as_bytes());
        bytes.push(b'\n');
        bytes
    }

    /// Feeds bytes in and returns every complete frame.
    ///
    /// Incomplete data is buffered for the next call. Empty lines are
    /// skipped, a trailing `\r` is stripped, and lines that are not UTF-8 are
    /// dropped with a warning.
    ///
    /// A line longer than the frame limit is dropped on its own, with a
    /// [`CodecError::FrameTooLarge`] warning, including any part of it that
    /// arrives in later calls. Frames before and after it are unaffected.
    pub fn decode(&mut self, data: &[u8]) -> Vec<String> {
        if self.read_pos >= COMPACT_THRESHOLD {
            self.buffer.drain(..self.read_pos);
            self.read_pos = 0;
        }

        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        let mut start = self.read_pos;

        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            if self.discarding {
                self.discarding = false;
            } else if offset > self.max_frame {
                self.skip(offset);
            } else {
                let mut line = &self.buffer[start..end];
                if let Some(stripped) = line.strip_suffix(b"\r") {
                    line = stripped;
                }
                if !line.is_empty() {
                    match std::str::from_utf8(line) {
                        Ok(text) => frames.push(text.to_owned()),
                        Err(e) => warn!(target: targets::CODEC, "dropping non UTF-8 frame: {}", e),
                    }
                }
            }
            start = end + 1;
        }

        self.read_pos = start;

        let remaining = self.buffer.len() - self.read_pos;
        if !self.discarding && remaining > self.max_frame {
            self.skip(remaining);
            self.discarding = true;
        }
        if self.discarding {
            self.drop_buffered();
        }

        frames
    }

    /// Returns any buffered bytes that never saw a terminating newline.
    ///
    /// Used at end of stream, where a peer may omit the final `\n`.
    pub fn finish(&mut self) -> Option<String> {
        let frame = if self.discarding {
            None
        } else {
            let tail = &self.buffer[self.read_pos..];
            let tail = tail.strip_suffix(b"\r").unwrap_or(tail);
            std::str::from_utf8(tail)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(str::to_owned)
        };
        self.clear();
        frame
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.drop_buffered();
        self.discarding = false;
    }

    fn drop_buffered(&mut self) {
        self.buffer.clear();
        self.read_pos = 0;
    }

    fn skip(&mut self, size: usize) {
        self.skipped += 1;
        warn!(target: targets::CODEC, "skipping line: {}", CodecError::FrameTooLarge(size));
    }
}

/// Codec error types.
#[derive(Debug)]
pub enum CodecError {
    /// A line exceeded the configured limit (size seen so far, in bytes).
    FrameTooLarge(usize),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::FrameTooLarge(size) => write!(f, "Frame too large: {size} bytes"),
        }
    }
}

impl std::error::Error for CodecError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_appends_newline() {
        let codec = LineCodec::new();
        let encoded = codec.encode(r#"{"jsonrpc":"2.0","method":"a"}"#);
        assert!(encoded.ends_with(b"}\n"));
    }

    #[test]
    fn test_decode_multiple_frames() {
        let mut codec = LineCodec::new();
        let frames = codec.decode(b"{\"id\":1}\n{\"id\":2}\n");
        assert_eq!(frames, vec![r#"{"id":1}"#, r#"{"id":2}"#]);
    }

    #[test]
    fn test_decode_partial_frame() {
        let mut codec = LineCodec::new();
        assert!(codec.decode(b"{\"event\":").is_empty());
        let frames = codec.decode(b"\"tick\"}\n");
        assert_eq!(frames, vec![r#"{"event":"tick"}"#]);
    }

    #[test]
    fn test_decode_skips_empty_and_strips_cr() {
        let mut codec = LineCodec::new();
        let frames = codec.decode(b"\n\r\n{\"id\":1}\r\n");
        assert_eq!(frames, vec![r#"{"id":1}"#]);
    }

    #[test]
    fn test_decode_passes_garbage_through() {
        let mut codec = LineCodec::new();
        assert_eq!(codec.decode(b"not json\n"), vec!["not json"]);
    }

    #[test]
    fn test_decode_drops_invalid_utf8() {
        let mut codec = LineCodec::new();
        let frames = codec.decode(b"\xff\xfe\n{\"id\":1}\n");
        assert_eq!(frames, vec![r#"{"id":1}"#]);
    }

    #[test]
    fn test_oversized_line_keeps_neighbours() {
        let mut codec = LineCodec::with_max_frame(32);
        let chunk = format!(
            "{{\"id\":0,\"result\":1}}\n{}\n{{\"id\":1,\"result\":2}}\n",
            "x".repeat(64)
        );
        let frames = codec.decode(chunk.as_bytes());
        assert_eq!(
            frames,
            vec![r#"{"id":0,"result":1}"#, r#"{"id":1,"result":2}"#]
        );
        assert_eq!(codec.skipped(), 1);
    }

    #[test]
    fn test_oversized_line_split_across_chunks() {
        let mut codec = LineCodec::with_max_frame(4);
        assert_eq!(codec.decode(b"1234\n123456"), vec!["1234"]);
        assert_eq!(codec.skipped(), 1);
        // The rest of the long line is dropped, not surfaced as a frame.
        assert!(codec.decode(b"789").is_empty());
        assert_eq!(codec.decode(b"0\nabc\n"), vec!["abc"]);
        assert_eq!(codec.skipped(), 1);
    }

    #[test]
    fn test_finish_drops_unterminated_oversized_tail() {
        let mut codec = LineCodec::with_max_frame(4);
        assert!(codec.decode(b"123456").is_empty());
        assert_eq!(codec.finish(), None);
        assert_eq!(codec.decode(b"ok\n"), vec!["ok"]);
    }

    #[test]
    fn test_line_at_limit_is_kept() {
        let mut codec = LineCodec::with_max_frame(4);
        assert_eq!(codec.decode(b"1234\n"), vec!["1234"]);
        assert_eq!(codec.skipped(), 0);
    }

    #[test]
    fn test_finish_returns_unterminated_tail() {
        let mut codec = LineCodec::new();
        assert_eq!(codec.decode(b"{\"id\":1}\n{\"id\":2}").len(), 1);
        assert_eq!(codec.finish().as_deref(), Some(r#"{"id":2}"#));
        assert_eq!(codec.finish(), None);
    }

    #[test]
    fn test_compaction_keeps_unread_data() {
        let mut codec = LineCodec::new();
        let line = format!("{}\n", "x".repeat(COMPACT_THRESHOLD));
        assert_eq!(codec.decode(line.as_bytes()).len(), 1);
        assert!(codec.decode(b"{\"id\"").is_empty());
        assert_eq!(codec.decode(b":3}\n"), vec![r#"{"id":3}"#]);
    }

    #[test]
    fn test_codec_error_display() {
        assert!(CodecError::FrameTooLarge(1000).to_string().contains("1000"));
    }
}
