//! Command handler trait and invocation context

use crate::auth::AuthHandler;
use crate::feed::PeerFeed;
use crate::gateway::MailingListGateway;
use crate::protocol::ProtocolLine;
use crate::server::handle::ResponseSender;
use crate::session::Session;
use crate::storage::Storage;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// What the dispatcher should do after a handler consumed a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerStatus {
    /// The handler wants the session's subsequent lines too
    Continue,
    /// The command completed; the next line starts a fresh dispatch
    Finished,
    /// The command completed and the connection should close (QUIT)
    Quit,
}

/// Collaborators and limits shared by every handler invocation
///
/// Constructed once at startup and injected into the engine; handlers
/// receive it per line rather than capturing global state.
pub struct CommandContext {
    pub storage: Arc<dyn Storage>,
    pub feed: Arc<dyn PeerFeed>,
    pub gateway: Arc<dyn MailingListGateway>,
    pub auth: Arc<AuthHandler>,
    /// Our own host token, matched against Path headers for loop prevention
    pub hostname: String,
    /// Maximum accumulated article size during POST
    pub max_article_size: usize,
}

/// A command handler, stateless (one line) or stateful (many lines)
///
/// Stateless handlers reply and return [`HandlerStatus::Finished`] from the
/// first call. A stateful handler returns [`HandlerStatus::Continue`] to
/// stay in flight; the dispatcher then delivers every subsequent session
/// line to it exclusively until it reports completion.
#[async_trait]
pub trait CommandHandler: Send {
    async fn on_line(
        &mut self,
        session: &mut Session,
        out: &ResponseSender,
        ctx: &CommandContext,
        line: &ProtocolLine,
    ) -> Result<HandlerStatus>;
}
