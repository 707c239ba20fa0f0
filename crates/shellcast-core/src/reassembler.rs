//! Per-stream reassembly of output chunks into log lines

use shellcast_exec::StreamKind;
use thiserror::Error;
use tracing::trace;

/// A chunk that is not valid UTF-8
#[derive(Error, Debug, Clone)]
#[error("{stream} chunk is not valid UTF-8: {source}")]
pub struct DecodeError {
    pub stream: StreamKind,
    #[source]
    pub source: std::str::Utf8Error,
}

/// Accumulates chunks of one stream until a chunk ends with a newline
///
/// Each chunk is trimmed before it is buffered, so whitespace at chunk
/// boundaries does not survive. A multi-byte character cut at a chunk boundary
/// is held back and completed by the next chunk.
#[derive(Debug)]
pub struct LineReassembler {
    stream: StreamKind,
    buffer: String,
    /// Leading bytes of a character whose remaining bytes have not arrived yet
    carry: Vec<u8>,
}

impl LineReassembler {
    #[must_use]
    pub fn new(stream: StreamKind) -> Self {
        Self {
            stream,
            buffer: String::new(),
            carry: Vec::new(),
        }
    }

    #[must_use]
    pub fn stream(&self) -> StreamKind {
        self.stream
    }

    /// Feed one chunk, returning a completed line if the chunk ended one
    ///
    /// # Errors
    /// Returns `DecodeError` if the chunk holds malformed UTF-8. A chunk that
    /// only ends in the middle of a character is not an error.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Option<String>, DecodeError> {
        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(chunk);

        let complete = match std::str::from_utf8(&bytes) {
            Ok(_) => bytes.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(source) => {
                return Err(DecodeError {
                    stream: self.stream,
                    source,
                });
            }
        };
        if complete < bytes.len() {
            trace!(
                stream = %self.stream,
                held = bytes.len() - complete,
                "holding split character"
            );
            self.carry = bytes[complete..].to_vec();
        }
        let text = std::str::from_utf8(&bytes[..complete]).map_err(|source| DecodeError {
            stream: self.stream,
            source,
        })?;

        let ends_line = text.ends_with('\n');
        let msg = text.trim();

        if msg.is_empty() {
            trace!(stream = %self.stream, len = chunk.len(), "skipping blank chunk");
            return Ok(None);
        }

        self.buffer.push_str(msg);

        if ends_line {
            Ok(Some(std::mem::take(&mut self.buffer)))
        } else {
            Ok(None)
        }
    }

    /// Take whatever partial line is left once the stream has closed
    ///
    /// An unfinished character at the very end is replaced with U+FFFD.
    pub fn finish(&mut self) -> Option<String> {
        if !self.carry.is_empty() {
            let tail = std::mem::take(&mut self.carry);
            self.buffer.push_str(&String::from_utf8_lossy(&tail));
        }
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }

    /// Bytes buffered but not yet emitted
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.buffer
    }
}
