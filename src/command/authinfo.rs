//! AUTHINFO USER/PASS handling (RFC 4643)
//!
//! The two-step exchange stages the username on the session; the handler
//! itself is stateless per line. Credential policy lives in [`crate::auth`].

use super::handler::{CommandContext, CommandHandler, HandlerStatus};
use crate::protocol::{responses, ProtocolLine};
use crate::server::handle::ResponseSender;
use crate::session::Session;
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

pub struct AuthInfoHandler;

#[async_trait]
impl CommandHandler for AuthInfoHandler {
    async fn on_line(
        &mut self,
        session: &mut Session,
        out: &ResponseSender,
        ctx: &CommandContext,
        line: &ProtocolLine,
    ) -> Result<HandlerStatus> {
        let text = line.text();
        let mut tokens = text.split_ascii_whitespace();
        tokens.next(); // AUTHINFO

        let subcommand = tokens.next().map(str::to_ascii_uppercase);
        let argument = tokens.next();

        match (subcommand.as_deref(), argument) {
            (Some("USER"), Some(username)) => {
                session.pending_auth_user = Some(username.to_string());
                out.send_line(responses::PASSWORD_REQUIRED);
            }
            (Some("PASS"), Some(password)) => {
                let Some(username) = session.pending_auth_user.take() else {
                    out.send_line(responses::AUTH_OUT_OF_SEQUENCE);
                    return Ok(HandlerStatus::Finished);
                };
                if ctx.auth.validate(&username, password) {
                    info!("{} authenticated as {}", session.id(), username);
                    session.authenticated_user = Some(username);
                    out.send_line(responses::AUTH_ACCEPTED);
                } else {
                    out.send_line(responses::AUTH_REJECTED);
                }
            }
            _ => out.send_line(responses::INVALID_USAGE),
        }
        Ok(HandlerStatus::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::{drain, test_env};

    #[tokio::test]
    async fn test_user_then_pass_accepted() {
        let (mut session, ctx, out, mut rx) = test_env();

        let mut handler = AuthInfoHandler;
        handler
            .on_line(&mut session, &out, &ctx, &"AUTHINFO USER alice".into())
            .await
            .unwrap();
        assert_eq!(drain(&mut rx), "381 password required\r\n");

        handler
            .on_line(&mut session, &out, &ctx, &"AUTHINFO PASS secret".into())
            .await
            .unwrap();
        // Auth disabled in the default test env accepts anything
        assert_eq!(drain(&mut rx), "281 authentication accepted\r\n");
        assert_eq!(session.authenticated_user.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_pass_without_user_out_of_sequence() {
        let (mut session, ctx, out, mut rx) = test_env();

        let mut handler = AuthInfoHandler;
        handler
            .on_line(&mut session, &out, &ctx, &"AUTHINFO PASS secret".into())
            .await
            .unwrap();
        assert!(drain(&mut rx).starts_with("482 "));
        assert!(session.authenticated_user.is_none());
    }

    #[tokio::test]
    async fn test_missing_argument_invalid_usage() {
        let (mut session, ctx, out, mut rx) = test_env();

        let mut handler = AuthInfoHandler;
        handler
            .on_line(&mut session, &out, &ctx, &"AUTHINFO USER".into())
            .await
            .unwrap();
        assert!(drain(&mut rx).starts_with("500 "));
    }
}
