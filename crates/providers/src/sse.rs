//! Incremental decoder for `data: ` event-stream bodies.
//!
//! Chunks may split both lines and multi-byte UTF-8 sequences. Undecodable
//! trailing bytes and unterminated lines are held until the next chunk.

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// One decoded `data: ` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// The `[DONE]` end-of-stream sentinel.
    Done,
    /// Anything else, trimmed, with the prefix removed.
    Payload(String),
}

/// Turns raw body chunks into [`StreamFrame`]s.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes of an incomplete UTF-8 sequence from the previous chunk.
    carry: Vec<u8>,
    /// Decoded text not yet terminated by `\n`.
    line: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes from the response body. Returns the frames completed by
    /// this chunk, in wire order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamFrame> {
        self.decode(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.line.find('\n') {
            let raw: String = self.line.drain(..=pos).collect();
            if let Some(frame) = parse_line(&raw[..raw.len() - 1]) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Flush whatever is buffered once the body has ended.
    pub fn finish(&mut self) -> Vec<StreamFrame> {
        if !self.carry.is_empty() {
            self.line.push(char::REPLACEMENT_CHARACTER);
            self.carry.clear();
        }
        let rest = std::mem::take(&mut self.line);
        parse_line(&rest).into_iter().collect()
    }

    fn decode(&mut self, chunk: &[u8]) {
        let owned;
        let mut bytes: &[u8] = if self.carry.is_empty() {
            chunk
        } else {
            self.carry.extend_from_slice(chunk);
            owned = std::mem::take(&mut self.carry);
            &owned
        };

        loop {
            match std::str::from_utf8(bytes) {
                Ok(text) => {
                    self.line.push_str(text);
                    return;
                }
                Err(err) => {
                    let (valid, rest) = bytes.split_at(err.valid_up_to());
                    // `valid_up_to` always lands on a char boundary.
                    self.line
                        .push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match err.error_len() {
                        Some(bad) => {
                            self.line.push(char::REPLACEMENT_CHARACTER);
                            bytes = &rest[bad..];
                        }
                        None => {
                            // Truncated sequence: wait for the next chunk.
                            self.carry = rest.to_vec();
                            return;
                        }
                    }
                }
            }
        }
    }
}

fn parse_line(line: &str) -> Option<StreamFrame> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let payload = line.strip_prefix(DATA_PREFIX)?.trim();
    if payload == DONE_SENTINEL {
        Some(StreamFrame::Done)
    } else {
        Some(StreamFrame::Payload(payload.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payloads(frames: &[StreamFrame]) -> Vec<&str> {
        frames
            .iter()
            .filter_map(|f| match f {
                StreamFrame::Payload(p) => Some(p.as_str()),
                StreamFrame::Done => None,
            })
            .collect()
    }

    fn feed_all(chunks: &[&[u8]]) -> Vec<StreamFrame> {
        let mut decoder = FrameDecoder::new();
        let mut frames = Vec::new();
        for chunk in chunks {
            frames.extend(decoder.feed(chunk));
        }
        frames.extend(decoder.finish());
        frames
    }

    #[test]
    fn test_basic_frames() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"data: hello\n\ndata: world\n\n");
        assert_eq!(payloads(&frames), vec!["hello", "world"]);
    }

    #[test]
    fn test_non_data_lines_ignored() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b":\n\nevent: ping\nid: 7\ndata: {\"a\":1}\n\n");
        assert_eq!(frames, vec![StreamFrame::Payload("{\"a\":1}".into())]);
    }

    #[test]
    fn test_prefix_requires_space() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data:{\"a\":1}\n").is_empty());
    }

    #[test]
    fn test_done_sentinel() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"data: x\n\ndata:  [DONE] \n\n");
        assert_eq!(
            frames,
            vec![StreamFrame::Payload("x".into()), StreamFrame::Done]
        );
    }

    #[test]
    fn test_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data: hel").is_empty());
        let frames = decoder.feed(b"lo\n\n");
        assert_eq!(payloads(&frames), vec!["hello"]);
    }

    #[test]
    fn test_crlf_lines() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"data: a\r\n\r\ndata: [DONE]\r\n");
        assert_eq!(frames, vec![StreamFrame::Payload("a".into()), StreamFrame::Done]);
    }

    #[test]
    fn test_unterminated_last_line_flushed() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), vec![StreamFrame::Payload("tail".into())]);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_multibyte_split_is_chunking_independent() {
        let body = "data: {\"t\":\"héllo ✨ wörld 🦀\"}\n\ndata: {\"t\":\"ünïcode\"}\n\n";
        let bytes = body.as_bytes();
        let crab = body.find('🦀').unwrap();
        let sparkle = body.find('✨').unwrap();

        let whole = feed_all(&[bytes]);
        // Two chunks, cut inside the 4-byte crab.
        let two = feed_all(&[&bytes[..crab + 2], &bytes[crab + 2..]]);
        // Three chunks, cutting inside the sparkle and after the crab's first byte.
        let three = feed_all(&[
            &bytes[..sparkle + 1],
            &bytes[sparkle + 1..crab + 1],
            &bytes[crab + 1..],
        ]);

        assert_eq!(payloads(&whole).len(), 2);
        assert_eq!(whole, two);
        assert_eq!(whole, three);
        assert!(payloads(&two)[0].contains("🦀"));
    }

    #[test]
    fn test_byte_at_a_time() {
        let body = "data: ∑ and ✓\n\n";
        let chunks: Vec<&[u8]> = body.as_bytes().chunks(1).collect();
        assert_eq!(payloads(&feed_all(&chunks)), vec!["∑ and ✓"]);
    }

    #[test]
    fn test_invalid_bytes_replaced() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"data: a\xffb\n");
        assert_eq!(payloads(&frames), vec!["a\u{fffd}b"]);
    }

    #[test]
    fn test_truncated_sequence_at_eof() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data: z\xe2\x9c").is_empty());
        assert_eq!(payloads(&decoder.finish()), vec!["z\u{fffd}"]);
    }
}
