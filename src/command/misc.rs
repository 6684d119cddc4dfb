//! Single-line administrative handlers

use super::handler::{CommandContext, CommandHandler, HandlerStatus};
use crate::protocol::{responses, ProtocolLine};
use crate::server::handle::ResponseSender;
use crate::session::Session;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

/// QUIT: acknowledge and close (RFC 3977 §5.4)
pub struct QuitHandler;

#[async_trait]
impl CommandHandler for QuitHandler {
    async fn on_line(
        &mut self,
        _session: &mut Session,
        out: &ResponseSender,
        _ctx: &CommandContext,
        _line: &ProtocolLine,
    ) -> Result<HandlerStatus> {
        out.send_line(responses::GOODBYE);
        Ok(HandlerStatus::Quit)
    }
}

/// Fallback for unrecognized keywords
pub struct UnsupportedHandler;

#[async_trait]
impl CommandHandler for UnsupportedHandler {
    async fn on_line(
        &mut self,
        _session: &mut Session,
        out: &ResponseSender,
        _ctx: &CommandContext,
        line: &ProtocolLine,
    ) -> Result<HandlerStatus> {
        tracing::debug!("unsupported command: {}", line.keyword());
        out.send_line(responses::NOT_SUPPORTED);
        Ok(HandlerStatus::Finished)
    }
}

/// DATE: server time in UTC (RFC 3977 §7.1)
pub struct DateHandler;

#[async_trait]
impl CommandHandler for DateHandler {
    async fn on_line(
        &mut self,
        _session: &mut Session,
        out: &ResponseSender,
        _ctx: &CommandContext,
        _line: &ProtocolLine,
    ) -> Result<HandlerStatus> {
        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        out.send_line(&format!("111 {}", stamp));
        Ok(HandlerStatus::Finished)
    }
}

/// HELP: command summary (RFC 3977 §7.2)
pub struct HelpHandler;

#[async_trait]
impl CommandHandler for HelpHandler {
    async fn on_line(
        &mut self,
        _session: &mut Session,
        out: &ResponseSender,
        _ctx: &CommandContext,
        _line: &ProtocolLine,
    ) -> Result<HandlerStatus> {
        out.send_multiline(
            "100 help text follows",
            [
                "ARTICLE [message-id|number]",
                "AUTHINFO USER name|PASS password",
                "BODY [message-id|number]",
                "CAPABILITIES",
                "DATE",
                "GROUP newsgroup",
                "HEAD [message-id|number]",
                "HELP",
                "LAST",
                "MODE READER",
                "NEXT",
                "POST",
                "QUIT",
                "STAT [message-id|number]",
            ],
        );
        Ok(HandlerStatus::Finished)
    }
}

/// CAPABILITIES: advertised feature set (RFC 3977 §5.2)
pub struct CapabilitiesHandler;

#[async_trait]
impl CommandHandler for CapabilitiesHandler {
    async fn on_line(
        &mut self,
        _session: &mut Session,
        out: &ResponseSender,
        ctx: &CommandContext,
        _line: &ProtocolLine,
    ) -> Result<HandlerStatus> {
        let mut capabilities = vec!["VERSION 2".to_string(), "READER".to_string(), "POST".to_string()];
        if ctx.auth.is_enabled() {
            capabilities.push("AUTHINFO USER".to_string());
        }
        out.send_multiline("101 capability list follows", capabilities);
        Ok(HandlerStatus::Finished)
    }
}

/// MODE READER: mode-switch acknowledgement (RFC 3977 §5.3)
pub struct ModeHandler;

#[async_trait]
impl CommandHandler for ModeHandler {
    async fn on_line(
        &mut self,
        _session: &mut Session,
        out: &ResponseSender,
        _ctx: &CommandContext,
        line: &ProtocolLine,
    ) -> Result<HandlerStatus> {
        let text = line.text();
        let mut tokens = text.split_ascii_whitespace();
        tokens.next(); // keyword
        match tokens.next() {
            Some(arg) if arg.eq_ignore_ascii_case("READER") => {
                out.send_line("200 posting allowed");
            }
            _ => out.send_line(responses::INVALID_USAGE),
        }
        Ok(HandlerStatus::Finished)
    }
}
