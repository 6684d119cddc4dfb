//! Validated domain types shared across the server

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Validation errors for domain types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("invalid message ID: {0}")]
    InvalidMessageId(String),

    #[error("group name cannot be empty")]
    EmptyGroupName,

    #[error("username cannot be empty or whitespace")]
    EmptyUsername,

    #[error("password cannot be empty or whitespace")]
    EmptyPassword,
}

/// Monotonically assigned identifier for an accepted connection
///
/// Assigned by the listener at accept time and used as the key into the
/// connection registry. Never reused within a process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A validated NNTP message-ID
///
/// Per RFC 3977 §3.6: 3-250 octets, begins with `<`, ends with `>`,
/// printable US-ASCII only, and `>` appears only at the end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Create a new MessageId after validation
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        let bytes = s.as_bytes();

        let structurally_valid = bytes.len() >= 3
            && bytes.len() <= 250
            && bytes.first() == Some(&b'<')
            && bytes.last() == Some(&b'>')
            && bytes[1..bytes.len() - 1]
                .iter()
                .all(|&b| (0x21..=0x7e).contains(&b) && b != b'>');

        if structurally_valid {
            Ok(Self(s))
        } else {
            Err(ValidationError::InvalidMessageId(s))
        }
    }

    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for MessageId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}
