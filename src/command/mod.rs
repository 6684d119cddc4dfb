//! Command dispatch: registry, handler trait, and the per-line dispatcher

mod authinfo;
mod handler;
mod misc;
mod post;
mod reader;
mod registry;

pub use authinfo::AuthInfoHandler;
pub use handler::{CommandContext, CommandHandler, HandlerStatus};
pub use misc::{
    CapabilitiesHandler, DateHandler, HelpHandler, ModeHandler, QuitHandler, UnsupportedHandler,
};
pub use post::PostHandler;
pub use reader::{ArticleHandler, GroupHandler, NavigateHandler, RetrieveMode};
pub use registry::CommandRegistry;

use crate::protocol::ProtocolLine;
use crate::server::handle::ResponseSender;
use crate::session::Session;
use anyhow::Result;
use std::sync::Arc;

/// Everything after the command keyword, trimmed
pub(crate) fn arguments(line: &ProtocolLine) -> String {
    line.text()
        .trim_start()
        .split_once(|c: char| c.is_ascii_whitespace())
        .map(|(_, rest)| rest.trim().to_string())
        .unwrap_or_default()
}

/// Routes each received line to the in-flight handler or a fresh one
///
/// Two-phase resolution: a line first goes to the session's in-flight
/// stateful handler if one exists; only otherwise is its first token
/// resolved through the registry. This is what lets a single handler
/// instance consume headers and body lines before control returns here.
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver one line on a session and report what the engine should do
    pub async fn dispatch(
        &self,
        session: &mut Session,
        out: &ResponseSender,
        ctx: &CommandContext,
        line: &ProtocolLine,
    ) -> Result<HandlerStatus> {
        let mut current = match session.in_flight.take() {
            Some(in_flight) => in_flight,
            None => self.registry.resolve(&line.keyword()),
        };

        let status = current.on_line(session, out, ctx, line).await?;
        match status {
            HandlerStatus::Continue => {
                session.in_flight = Some(current);
            }
            HandlerStatus::Finished | HandlerStatus::Quit => {
                session.reset_encoding();
            }
        }
        Ok(status)
    }
}

/// Shared construction helpers for handler unit tests
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::auth::AuthHandler;
    use crate::feed::NoopFeed;
    use crate::gateway::NoopGateway;
    use crate::server::handle::{output_channel, ConnectionHandle};
    use crate::storage::MemoryStorage;
    use crate::types::ConnectionId;
    use bytes::Bytes;
    use tokio::sync::mpsc::UnboundedReceiver;

    /// Session, context, and a response channel wired to nothing
    pub(crate) fn test_env() -> (
        Session,
        CommandContext,
        ResponseSender,
        UnboundedReceiver<Bytes>,
    ) {
        test_env_with_storage(Arc::new(MemoryStorage::new()))
    }

    pub(crate) fn test_env_with_storage(
        storage: Arc<MemoryStorage>,
    ) -> (
        Session,
        CommandContext,
        ResponseSender,
        UnboundedReceiver<Bytes>,
    ) {
        let session = Session::new(ConnectionId::new(1));
        let ctx = CommandContext {
            storage,
            feed: Arc::new(NoopFeed),
            gateway: Arc::new(NoopGateway),
            auth: Arc::new(AuthHandler::default()),
            hostname: "news.test".to_string(),
            max_article_size: crate::constants::protocol::MAX_ARTICLE_SIZE,
        };
        let handle = ConnectionHandle::new(ConnectionId::new(1), "127.0.0.1:0".parse().unwrap());
        let (sender, rx) = output_channel(handle);
        (session, ctx, sender, rx)
    }

    /// Collect everything currently queued on the output channel
    pub(crate) fn drain(rx: &mut UnboundedReceiver<Bytes>) -> String {
        let mut out = String::new();
        while let Ok(buf) = rx.try_recv() {
            out.push_str(&String::from_utf8_lossy(&buf));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{drain, test_env};
    use super::*;
    use crate::constants::session::DEFAULT_ENCODING;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(CommandRegistry::standard()))
    }

    #[test]
    fn test_arguments_extraction() {
        assert_eq!(arguments(&"GROUP local.test".into()), "local.test");
        assert_eq!(arguments(&"QUIT".into()), "");
        assert_eq!(arguments(&"ARTICLE  <a@b>  ".into()), "<a@b>");
    }

    #[tokio::test]
    async fn test_unknown_keyword_gets_fallback() {
        let (mut session, ctx, out, mut rx) = test_env();
        let status = dispatcher()
            .dispatch(&mut session, &out, &ctx, &"XZVER 1-100".into())
            .await
            .unwrap();
        assert_eq!(status, HandlerStatus::Finished);
        assert_eq!(drain(&mut rx), "500 command not supported\r\n");
    }

    #[tokio::test]
    async fn test_keyword_is_case_insensitive() {
        let (mut session, ctx, out, mut rx) = test_env();
        dispatcher()
            .dispatch(&mut session, &out, &ctx, &"quit".into())
            .await
            .unwrap();
        assert_eq!(drain(&mut rx), "205 bye\r\n");
    }

    #[tokio::test]
    async fn test_stateful_handler_gets_subsequent_lines_exclusively() {
        let (mut session, ctx, out, mut rx) = test_env();
        let dispatcher = dispatcher();

        let status = dispatcher
            .dispatch(&mut session, &out, &ctx, &"POST".into())
            .await
            .unwrap();
        assert_eq!(status, HandlerStatus::Continue);
        assert!(session.has_in_flight());
        assert_eq!(drain(&mut rx), "340 send article\r\n");

        // A line that is itself a valid command keyword still goes to the
        // in-flight POST handler, not to a new QUIT handler
        let status = dispatcher
            .dispatch(&mut session, &out, &ctx, &"QUIT: not a command here".into())
            .await
            .unwrap();
        assert_eq!(status, HandlerStatus::Continue);
        assert!(session.has_in_flight());
        assert_eq!(drain(&mut rx), "");
    }

    #[tokio::test]
    async fn test_finished_clears_in_flight_and_resets_encoding() {
        let (mut session, ctx, out, mut rx) = test_env();
        let dispatcher = dispatcher();

        dispatcher
            .dispatch(&mut session, &out, &ctx, &"POST".into())
            .await
            .unwrap();
        session.encoding = "ISO-8859-1".to_string();

        // Abort the post: headers that fail to parse finish the handler
        dispatcher
            .dispatch(&mut session, &out, &ctx, &"garbage header line".into())
            .await
            .unwrap();
        let status = dispatcher
            .dispatch(&mut session, &out, &ctx, &"".into())
            .await
            .unwrap();
        assert_eq!(status, HandlerStatus::Finished);
        assert!(!session.has_in_flight());
        assert_eq!(session.encoding, DEFAULT_ENCODING);
        assert!(drain(&mut rx).contains("500 posting failed"));
    }

    #[tokio::test]
    async fn test_no_second_dispatch_before_completion() {
        let (mut session, ctx, out, mut rx) = test_env();
        let dispatcher = dispatcher();

        dispatcher
            .dispatch(&mut session, &out, &ctx, &"POST".into())
            .await
            .unwrap();
        drain(&mut rx);

        // Every line until the terminator is consumed by the same handler
        for line in ["Subject: t", "From: a@b", "Newsgroups: nowhere", ""] {
            let status = dispatcher
                .dispatch(&mut session, &out, &ctx, &line.into())
                .await
                .unwrap();
            assert_eq!(status, HandlerStatus::Continue);
        }
        let status = dispatcher
            .dispatch(&mut session, &out, &ctx, &".".into())
            .await
            .unwrap();
        assert_eq!(status, HandlerStatus::Finished);
    }
}
