//! Line framing over a raw byte stream
//!
//! Turns arbitrarily chunked socket reads into discrete CRLF-terminated
//! protocol lines and enforces the maximum line length. One framer instance
//! belongs to exactly one connection's read path; it is deliberately not
//! shared across tasks.

use bytes::{Bytes, BytesMut};
use std::borrow::Cow;
use thiserror::Error;

/// Framing errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum FramerError {
    /// The accumulated line exceeded the configured maximum before a
    /// terminator appeared. The connection must be closed after replying.
    #[error("protocol line exceeds {limit} octets")]
    LineTooLong { limit: usize },
}

/// A complete protocol line, free of CR and LF
///
/// The unit exchanged between the framer and command handlers. No partial
/// line ever crosses this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolLine(Bytes);

impl ProtocolLine {
    /// Wrap a line that is already known to be terminator-free
    #[must_use]
    pub fn new(bytes: Bytes) -> Self {
        debug_assert!(!bytes.contains(&b'\r') && !bytes.contains(&b'\n'));
        Self(bytes)
    }

    #[must_use]
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Line content as text, with invalid UTF-8 replaced
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// First whitespace-delimited token, uppercased for registry lookup
    #[must_use]
    pub fn keyword(&self) -> String {
        self.text()
            .split_ascii_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase()
    }
}

impl From<&str> for ProtocolLine {
    fn from(s: &str) -> Self {
        Self::new(Bytes::copy_from_slice(s.as_bytes()))
    }
}

/// Incremental line framer with a bounded accumulation buffer
///
/// `feed` appends raw bytes; `next_line` drains one complete line at a
/// time, so the caller controls how far a single read is processed before
/// more input arrives. Bytes that do not yet complete a line are retained.
#[derive(Debug)]
pub struct LineFramer {
    buf: BytesMut,
    max_line: usize,
}

impl LineFramer {
    /// Create a framer enforcing `max_line` payload octets (excluding CRLF)
    #[must_use]
    pub fn new(max_line: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(max_line.min(4096)),
            max_line,
        }
    }

    /// Append raw bytes from the socket to the accumulation buffer
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Extract the next complete line, if one has been accumulated
    ///
    /// A trailing CR before the LF is stripped; a bare LF also terminates a
    /// line. Returns `Ok(None)` when more input is needed. Fails with
    /// [`FramerError::LineTooLong`] as soon as either a completed line or
    /// the unterminated prefix exceeds the maximum, so a misbehaving peer
    /// cannot grow the buffer without bound.
    pub fn next_line(&mut self) -> Result<Option<ProtocolLine>, FramerError> {
        match memchr::memchr(b'\n', &self.buf) {
            Some(pos) => {
                let mut line = self.buf.split_to(pos + 1);
                line.truncate(pos);
                if line.last() == Some(&b'\r') {
                    line.truncate(line.len() - 1);
                }
                if line.len() > self.max_line {
                    return Err(FramerError::LineTooLong {
                        limit: self.max_line,
                    });
                }
                Ok(Some(ProtocolLine::new(line.freeze())))
            }
            None => {
                // A pending CR may still become part of the terminator, so
                // it does not count against the payload limit yet.
                let payload = if self.buf.last() == Some(&b'\r') {
                    self.buf.len() - 1
                } else {
                    self.buf.len()
                };
                if payload > self.max_line {
                    return Err(FramerError::LineTooLong {
                        limit: self.max_line,
                    });
                }
                Ok(None)
            }
        }
    }

    /// Number of buffered bytes not yet forming a complete line
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.buf.len()
    }
}

/// Dot-stuff a payload line for a multi-line response body
///
/// RFC 3977 §3.1.1: a body line beginning with `.` is sent with the dot
/// doubled so it cannot be mistaken for the terminator.
#[must_use]
pub fn dot_stuff(line: &[u8]) -> Vec<u8> {
    if line.first() == Some(&b'.') {
        let mut out = Vec::with_capacity(line.len() + 1);
        out.push(b'.');
        out.extend_from_slice(line);
        out
    } else {
        line.to_vec()
    }
}

/// Reverse of [`dot_stuff`], applied to received multi-line payload lines
#[must_use]
pub fn dot_unstuff(line: &[u8]) -> &[u8] {
    if line.starts_with(b"..") {
        &line[1..]
    } else {
        line
    }
}
