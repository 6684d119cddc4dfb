//! Article model and RFC 5322 header parsing
//!
//! Articles accumulated during POST outlive the read buffer, so headers are
//! parsed into an owned, order-preserving list rather than borrowed slices.

use crate::types::MessageId;
use bytes::Bytes;
use thiserror::Error;

/// Header parse errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("article carries no Newsgroups header")]
    MissingNewsgroups,
}

/// Ordered article headers with case-insensitive lookup
///
/// Per RFC 5322: each header is `name: value`, names contain printable
/// ASCII without colons or spaces, and continuation lines start with
/// whitespace and fold into the preceding value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Parse an accumulated header block
    ///
    /// `text` is the raw header text without the terminating blank line.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut entries: Vec<(String, String)> = Vec::new();

        for line in text.lines() {
            if line.is_empty() {
                continue;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                // Folded continuation of the previous header
                let Some((_, value)) = entries.last_mut() else {
                    return Err(ParseError::InvalidHeader(
                        "header cannot start with folding whitespace".to_string(),
                    ));
                };
                value.push(' ');
                value.push_str(line.trim_start());
                continue;
            }

            let colon = memchr::memchr(b':', line.as_bytes()).ok_or_else(|| {
                ParseError::InvalidHeader(format!("header missing colon: {}", line))
            })?;

            let name = &line[..colon];
            if name.is_empty() {
                return Err(ParseError::InvalidHeader("empty header name".to_string()));
            }
            if name
                .bytes()
                .any(|b| b == b' ' || b == b'\t' || !(33..=126).contains(&b))
            {
                return Err(ParseError::InvalidHeader(format!(
                    "invalid character in header name: {}",
                    name
                )));
            }

            let value = line[colon + 1..].trim().to_string();
            entries.push((name.to_string(), value));
        }

        Ok(Self { entries })
    }

    /// Get a header value by name (case-insensitive)
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replace a header value, or append the header if absent
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the header block as wire lines, one `name: value` per entry
    pub fn wire_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.entries
            .iter()
            .map(|(n, v)| format!("{}: {}", n, v))
    }
}

/// A Usenet article: structured headers plus an opaque body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub message_id: MessageId,
    pub headers: Headers,
    pub body: Bytes,
}

impl Article {
    #[must_use]
    pub fn new(message_id: MessageId, headers: Headers, body: Bytes) -> Self {
        Self {
            message_id,
            headers,
            body,
        }
    }

    /// Destination groups from the Newsgroups header, comma-separated
    #[must_use]
    pub fn newsgroups(&self) -> Vec<&str> {
        self.headers
            .get("Newsgroups")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Control directive, e.g. `cancel <id@host>`, if present
    #[must_use]
    pub fn control(&self) -> Option<&str> {
        self.headers.get("Control")
    }

    /// Message-id this article supersedes, if present
    #[must_use]
    pub fn supersedes(&self) -> Option<&str> {
        self.headers.get("Supersedes")
    }

    /// Whether our own host already appears as a token in the Path header
    ///
    /// Path entries are `!`-separated; matching whole tokens avoids false
    /// positives on hosts that merely share a suffix.
    #[must_use]
    pub fn path_contains(&self, host: &str) -> bool {
        self.headers
            .get("Path")
            .map(|path| path.split('!').any(|token| token.trim() == host))
            .unwrap_or(false)
    }

    /// Attach the Lines and Bytes headers derived from the body
    pub fn attach_size_headers(&mut self) {
        self.headers.set("Lines", self.line_count().to_string());
        self.headers.set("Bytes", self.body.len().to_string());
    }

    /// Body line count as counted for the Lines header
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.body
            .split(|&b| b == b'\n')
            .filter(|l| !l.is_empty())
            .count()
    }
}
