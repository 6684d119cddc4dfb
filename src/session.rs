//! Per-connection session state
//!
//! One `Session` per accepted connection, owned exclusively by that
//! connection's engine task. The connection registry never holds a session;
//! it only tracks the shared liveness handle.

use crate::command::CommandHandler;
use crate::constants::session::DEFAULT_ENCODING;
use crate::types::ConnectionId;

/// Group selection made by a GROUP command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedGroup {
    pub name: String,
    pub low: u64,
    pub high: u64,
}

/// Mutable state carried across the commands of one connection
pub struct Session {
    id: ConnectionId,
    /// Text encoding for protocol lines, reset after every completed command
    pub encoding: String,
    /// Group selected by GROUP, if any
    pub group: Option<SelectedGroup>,
    /// Current article cursor within the selected group
    pub current_article: Option<u64>,
    /// Identity established by AUTHINFO, if any
    pub authenticated_user: Option<String>,
    /// Username staged by AUTHINFO USER awaiting AUTHINFO PASS
    pub pending_auth_user: Option<String>,
    /// Stateful handler consuming subsequent lines, when one is in flight
    pub in_flight: Option<Box<dyn CommandHandler>>,
}

impl Session {
    #[must_use]
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            encoding: DEFAULT_ENCODING.to_string(),
            group: None,
            current_article: None,
            authenticated_user: None,
            pending_auth_user: None,
            in_flight: None,
        }
    }

    #[must_use]
    #[inline]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Whether a stateful command is currently consuming lines
    #[must_use]
    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Restore the default text encoding, called when a command completes
    pub fn reset_encoding(&mut self) {
        if self.encoding != DEFAULT_ENCODING {
            self.encoding = DEFAULT_ENCODING.to_string();
        }
    }

    /// Select a group and rewind the article cursor to its low mark
    ///
    /// Article numbering starts at 1, so a low mark of 0 means the group
    /// holds no articles and the cursor stays unset.
    pub fn select_group(&mut self, name: &str, low: u64, high: u64) {
        self.group = Some(SelectedGroup {
            name: name.to_string(),
            low,
            high,
        });
        self.current_article = if low > 0 { Some(low) } else { None };
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("encoding", &self.encoding)
            .field("group", &self.group)
            .field("current_article", &self.current_article)
            .field("authenticated_user", &self.authenticated_user)
            .field("in_flight", &self.in_flight.is_some())
            .finish()
    }
}
