//! Incremental two-channel stream parsing.
//!
//! The generation backend is instructed to emit private reasoning inside
//! `<thinking>`…`</thinking>` and the user-facing answer outside. Deltas
//! arrive with arbitrary boundaries, so every push appends to the full
//! buffer and re-derives both channels from scratch. The same final
//! split is produced regardless of how the stream was chunked.

pub const THINKING_OPEN: &str = "<thinking>";
pub const THINKING_CLOSE: &str = "</thinking>";

/// Parser phase, advanced only by text seen in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePhase {
    /// No opening tag yet; the whole buffer is answer text.
    AwaitingTag,
    /// Opening tag seen, closing tag not yet.
    InReasoning,
    /// Closing tag seen; answer text follows it.
    Done,
}

/// Snapshot of both channels after a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStream {
    pub reasoning: String,
    pub answer: String,
    pub phase: ParsePhase,
}

/// Accumulating parser over streamed text deltas.
#[derive(Debug, Default)]
pub struct StreamResponseParser {
    buffer: String,
}

impl StreamResponseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one delta and re-derive the channel split.
    pub fn push(&mut self, delta: &str) -> ParsedStream {
        self.buffer.push_str(delta);
        self.derive()
    }

    /// The current split without appending anything.
    pub fn current(&self) -> ParsedStream {
        self.derive()
    }

    fn derive(&self) -> ParsedStream {
        let buffer = &self.buffer;
        match buffer.find(THINKING_OPEN) {
            Some(open_at) => {
                let after_open = &buffer[open_at + THINKING_OPEN.len()..];
                match after_open.find(THINKING_CLOSE) {
                    Some(close_at) => ParsedStream {
                        reasoning: after_open[..close_at].trim().to_string(),
                        answer: after_open[close_at + THINKING_CLOSE.len()..]
                            .trim()
                            .to_string(),
                        phase: ParsePhase::Done,
                    },
                    None => ParsedStream {
                        reasoning: after_open.trim().to_string(),
                        answer: String::new(),
                        phase: ParsePhase::InReasoning,
                    },
                }
            }
            None => ParsedStream {
                reasoning: String::new(),
                answer: buffer.trim().to_string(),
                phase: ParsePhase::AwaitingTag,
            },
        }
    }
}
