//! The per-exchange stream decoder state machine.
//!
//! The transport delivers the response body as raw byte fragments that
//! may split anywhere, including inside a multi-byte UTF-8 sequence or
//! in the middle of a line. [`StreamDecoder`] reassembles those
//! fragments into complete lines and turns each line into zero or one
//! content delta via a caller-supplied extractor.
//!
//! One decoder drives one exchange:
//!
//! ```text
//!   feed(Some(bytes))*          feed(None)
//!  ───────────────────▶ streaming ──────────▶ done
//! ```
//!
//! Rules, per chunk:
//!
//! 1. Incoming bytes are appended to the pending buffer (with a valid
//!    UTF-8 prefix decode, so a fragment boundary inside a code point
//!    is invisible to the caller).
//! 2. Every newline-terminated line is split off, trimmed, and handed
//!    to the extractor (or passed through in raw mode). A trailing
//!    partial line stays buffered and is never emitted early.
//! 3. End of stream (`feed(None)`) flushes any non-empty remainder as
//!    one final line, then the decoder is done and ignores further
//!    input.
//!
//! Raw-passthrough mode skips extraction entirely: the first emission
//! of the exchange is prefixed with an opening code fence announcing a
//! raw JSON block, subsequent lines pass through verbatim, and end of
//! stream appends one final emission holding only the closing fence.
//! An exchange that never emitted anything produces no fences.
//!
//! Deltas accumulate into the full response text, which the caller
//! reads after the final flush.

use tracing::warn;

/// Opening fence prepended to the first raw-mode emission.
pub const RAW_FENCE_OPEN: &str = "```json\n";

/// Closing fence emitted on its own at the end of a raw-mode exchange.
pub const RAW_FENCE_CLOSE: &str = "\n```";

/// Maximum size for the pending buffers before content is dropped.
/// Oversized garbage input degrades (with a warning) instead of
/// aborting the exchange.
const MAX_BUF: usize = 16 * 1024 * 1024; // 16 MiB

/// Line reassembly and delta emission for one exchange.
///
/// Create one per exchange, call [`feed`](Self::feed) for every
/// transport chunk in arrival order, and finish with `feed(None)`.
#[derive(Debug)]
pub struct StreamDecoder {
    /// Text waiting for its terminating newline.
    line_buf: String,
    /// Bytes waiting to complete a UTF-8 sequence.
    utf8_buf: Vec<u8>,
    /// Every delta emitted so far, concatenated.
    response: String,
    /// Pass lines through without extraction.
    raw_mode: bool,
    /// No emission has happened yet on this exchange.
    first_emission: bool,
    /// End of stream was seen; further input is ignored.
    done: bool,
}

impl StreamDecoder {
    /// Creates a decoder for a new exchange.
    pub fn new(raw_mode: bool) -> Self {
        Self {
            line_buf: String::new(),
            utf8_buf: Vec::new(),
            response: String::new(),
            raw_mode,
            first_emission: true,
            done: false,
        }
    }

    /// Feeds one transport chunk; `None` marks end of stream.
    ///
    /// Returns the deltas to surface to the caller, in order. The
    /// extractor receives each complete trimmed line and returns the
    /// content found in it (empty when there is none); it is not called
    /// in raw mode.
    pub fn feed<E>(&mut self, chunk: Option<&[u8]>, mut extract: E) -> Vec<String>
    where
        E: FnMut(&str) -> String,
    {
        if self.done {
            return Vec::new();
        }

        let mut out = Vec::new();
        match chunk {
            Some(bytes) => {
                self.absorb(bytes);
                while let Some(pos) = self.line_buf.find('\n') {
                    let line = self.line_buf[..pos].trim().to_string();
                    self.line_buf.drain(..=pos);
                    self.emit_line(&line, &mut extract, &mut out);
                }
            }
            None => {
                // A trailing fragment without its newline still counts
                // as one final line.
                let remainder = self.line_buf.trim().to_string();
                if !remainder.is_empty() {
                    self.emit_line(&remainder, &mut extract, &mut out);
                }
                self.line_buf.clear();
                self.utf8_buf.clear();
                if self.raw_mode && !self.first_emission {
                    self.response.push_str(RAW_FENCE_CLOSE);
                    out.push(RAW_FENCE_CLOSE.to_string());
                }
                self.done = true;
            }
        }
        out
    }

    /// Returns `true` once end of stream has been processed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The full accumulated response so far.
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Consumes the decoder, yielding the accumulated response.
    pub fn into_response(self) -> String {
        self.response
    }

    /// Appends bytes, decoding the valid UTF-8 prefix into the line
    /// buffer and keeping any incomplete trailing sequence for the
    /// next chunk.
    fn absorb(&mut self, bytes: &[u8]) {
        self.utf8_buf.extend_from_slice(bytes);

        if self.utf8_buf.len() > MAX_BUF || self.line_buf.len() > MAX_BUF {
            warn!("stream buffer exceeded {MAX_BUF} bytes; dropping pending data");
            self.utf8_buf.clear();
            self.line_buf.clear();
            return;
        }

        loop {
            match std::str::from_utf8(&self.utf8_buf) {
                Ok(text) => {
                    self.line_buf.push_str(text);
                    self.utf8_buf.clear();
                    break;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    if valid_up_to > 0 {
                        // SAFETY: `from_utf8` validated bytes up to
                        // this index are valid UTF-8.
                        let valid = unsafe {
                            std::str::from_utf8_unchecked(&self.utf8_buf[..valid_up_to])
                        };
                        self.line_buf.push_str(valid);
                    }
                    match e.error_len() {
                        // Skip past permanently invalid bytes and keep
                        // decoding the rest of the chunk.
                        Some(len) => {
                            self.utf8_buf.drain(..valid_up_to + len);
                        }
                        // An incomplete sequence at the end waits for
                        // the next chunk.
                        None => {
                            self.utf8_buf.drain(..valid_up_to);
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Handles one complete trimmed line.
    fn emit_line<E>(&mut self, line: &str, extract: &mut E, out: &mut Vec<String>)
    where
        E: FnMut(&str) -> String,
    {
        if self.raw_mode {
            if line.is_empty() {
                return;
            }
            let text = if self.first_emission {
                format!("{RAW_FENCE_OPEN}{line}")
            } else {
                line.to_string()
            };
            self.first_emission = false;
            self.response.push_str(&text);
            out.push(text);
        } else {
            let extracted = extract(line);
            if !extracted.is_empty() {
                self.first_emission = false;
                self.response.push_str(&extracted);
                out.push(extracted);
            }
        }
    }
}
