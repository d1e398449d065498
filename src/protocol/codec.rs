//! Newline-delimited JSON codec.
//!
//! One message is one compact JSON object followed by a single `\n`.
//! There are no length prefixes and no checksums. JSON string escaping
//! guarantees a serialized message never contains a raw newline, so the
//! newline is an unambiguous boundary.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

use super::Response;

// ============================================================================
// Constants
// ============================================================================

/// Message delimiter.
pub const DELIMITER: u8 = b'\n';

// ============================================================================
// Encode / Decode
// ============================================================================

/// Borrowed command envelope, so encoding never clones the payload.
#[derive(Serialize)]
struct EnvelopeRef<'a> {
    command: &'a str,
    payload: &'a Value,
}

/// Encodes a command envelope as one newline-terminated line.
///
/// # Errors
///
/// Returns [`Error::Json`] if the payload cannot be serialized.
pub fn encode(command: &str, payload: &Value) -> Result<Vec<u8>> {
    let mut line = serde_json::to_vec(&EnvelopeRef { command, payload })?;
    line.push(DELIMITER);
    Ok(line)
}

/// Decodes one response line.
///
/// Accepts the line with or without its trailing `\n` (and tolerates a
/// `\r\n` ending).
///
/// # Errors
///
/// Returns [`Error::Decode`] if the line is not a response envelope.
/// Callers drop such lines; peers may print diagnostics on the socket.
pub fn decode(line: &[u8]) -> Result<Response> {
    let line = trim_line_ending(line);
    serde_json::from_slice(line).map_err(|e| Error::decode(e.to_string()))
}

fn trim_line_ending(mut line: &[u8]) -> &[u8] {
    if let [rest @ .., DELIMITER] = line {
        line = rest;
    }
    if let [rest @ .., b'\r'] = line {
        line = rest;
    }
    line
}

// ============================================================================
// LineBuffer
// ============================================================================

/// Accumulates socket bytes and yields complete lines.
///
/// Partial trailing data is kept across reads. The buffer belongs to a
/// single connection and is discarded with it.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
    /// Bytes already scanned for a delimiter.
    scanned: usize,
}

impl LineBuffer {
    /// Creates an empty buffer.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Removes and returns the next complete line, without its delimiter.
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let offset = self.buf[self.scanned..]
            .iter()
            .position(|&b| b == DELIMITER);

        match offset {
            Some(offset) => {
                let end = self.scanned + offset;
                let mut line: Vec<u8> = self.buf.drain(..=end).collect();
                line.pop();
                self.scanned = 0;
                Some(line)
            }
            None => {
                self.scanned = self.buf.len();
                None
            }
        }
    }

    /// Discards everything.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.scanned = 0;
    }

    /// Returns the number of buffered bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing is buffered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
