//! POST: the stateful article posting state machine
//!
//! POST spans many protocol lines: the command itself, a header block, a
//! blank separator, body lines, and the terminating `.`. The handler stays
//! in flight on the session until it reports completion, so every line in
//! between reaches it exclusively.

use super::handler::{CommandContext, CommandHandler, HandlerStatus};
use crate::constants::{buffer, groups};
use crate::protocol::{dot_unstuff, responses, Article, Headers, ProtocolLine};
use crate::server::handle::ResponseSender;
use crate::session::Session;
use crate::storage::{with_retry, StorageError};
use crate::types::MessageId;
use anyhow::Result;
use async_trait::async_trait;
use bytes::{BufMut, BytesMut};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PostState {
    /// Waiting for the POST command line itself
    AwaitCommand,
    ReadingHeaders,
    ReadingBody,
}

/// Stateful handler accumulating one posted article
pub struct PostHandler {
    state: PostState,
    header_text: String,
    headers: Option<Headers>,
    body: BytesMut,
}

impl PostHandler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: PostState::AwaitCommand,
            header_text: String::with_capacity(buffer::HEADER_INITIAL),
            headers: None,
            body: BytesMut::with_capacity(buffer::BODY_INITIAL),
        }
    }

    fn accumulated(&self) -> usize {
        self.header_text.len() + self.body.len()
    }

    /// Finalize the body, attach size headers, and run post-processing
    async fn finish(
        &mut self,
        out: &ResponseSender,
        ctx: &CommandContext,
        headers: Headers,
    ) -> HandlerStatus {
        // The terminator is not part of the body
        let mut body = std::mem::take(&mut self.body);
        if body.ends_with(b"\r\n") {
            body.truncate(body.len() - 2);
        }

        let mut headers = headers;
        let message_id = match headers.get("Message-ID").and_then(|v| MessageId::new(v).ok()) {
            Some(id) => id,
            None => {
                let generated =
                    MessageId::new(format!("<{}@{}>", uuid::Uuid::new_v4(), ctx.hostname))
                        .expect("generated message-id is structurally valid");
                headers.set("Message-ID", generated.as_str());
                generated
            }
        };
        if !headers.contains("Date") {
            headers.set("Date", chrono::Utc::now().to_rfc2822());
        }

        let mut article = Article::new(message_id, headers, body.freeze());
        article.attach_size_headers();

        self.post_process(out, ctx, article).await
    }

    /// The ReadingHeaders/ReadingBody -> Finished edge
    async fn post_process(
        &self,
        out: &ResponseSender,
        ctx: &CommandContext,
        article: Article,
    ) -> HandlerStatus {
        if let Some(directive) = article.control().map(str::to_string) {
            if let Some(target) = parse_cancel(&directive) {
                return self.apply_cancel(out, ctx, article, &target).await;
            }
            debug!("uninterpreted control directive: {}", directive);
            // Other control verbs are treated as ordinary postings
        }

        if let Some(superseded) = article.supersedes().and_then(|v| MessageId::new(v).ok()) {
            return self.apply_supersede(out, ctx, article, &superseded).await;
        }

        // Relay loop prevention: we have seen this article if our own host
        // token already appears in its Path
        if article.path_contains(&ctx.hostname) {
            out.send_line(responses::ALREADY_KNOWN);
            return HandlerStatus::Finished;
        }

        let mut accepted = false;
        let mut store_needed = false;
        for name in article.newsgroups().iter().map(|s| s.to_string()) {
            let group = match with_retry(|| ctx.storage.resolve_group(&name)).await {
                Ok(Some(group)) if !group.deleted => group,
                Ok(_) => continue,
                Err(e) => {
                    warn!("group resolution failed for {}: {}", name, e);
                    out.send_line(responses::INTERNAL_ERROR);
                    return HandlerStatus::Finished;
                }
            };

            if group.is_list_backed() {
                if ctx.gateway.route_to_list(&article, &group).await {
                    accepted = true;
                }
            } else {
                store_needed = true;
                accepted = true;
            }
        }

        if !accepted {
            out.send_line(responses::NO_SUCH_NEWSGROUP);
            return HandlerStatus::Finished;
        }

        if store_needed {
            match with_retry(|| ctx.storage.article_exists(&article.message_id)).await {
                Ok(true) => {
                    // Duplicate message-id: accepted as already posted,
                    // deliberately without a second store call
                    debug!("duplicate posting accepted: {}", article.message_id);
                }
                Ok(false) => {
                    if let Err(e) = with_retry(|| ctx.storage.store(article.clone())).await {
                        warn!("storing {} failed: {}", article.message_id, e);
                        out.send_line(responses::INTERNAL_ERROR);
                        return HandlerStatus::Finished;
                    }
                }
                Err(e) => {
                    warn!("duplicate check for {} failed: {}", article.message_id, e);
                    out.send_line(responses::INTERNAL_ERROR);
                    return HandlerStatus::Finished;
                }
            }
        }

        info!("article {} posted", article.message_id);
        out.send_line(responses::POSTED_OK);
        ctx.feed.enqueue(article);
        HandlerStatus::Finished
    }

    async fn apply_cancel(
        &self,
        out: &ResponseSender,
        ctx: &CommandContext,
        mut article: Article,
        target: &MessageId,
    ) -> HandlerStatus {
        match with_retry(|| ctx.storage.delete(target)).await {
            Ok(()) => {}
            // Cancelling an article we never had still records the cancel
            Err(StorageError::NoSuchArticle(_)) => {
                debug!("cancel target {} not present", target);
            }
            Err(e) => {
                warn!("cancel of {} failed: {}", target, e);
                out.send_line(responses::INTERNAL_ERROR);
                return HandlerStatus::Finished;
            }
        }

        article.headers.set("Newsgroups", groups::CONTROL);
        if let Err(e) = with_retry(|| ctx.storage.store(article.clone())).await {
            warn!("storing control article failed: {}", e);
            out.send_line(responses::INTERNAL_ERROR);
            return HandlerStatus::Finished;
        }

        info!("article {} cancelled by {}", target, article.message_id);
        out.send_line(responses::CANCELLED);
        HandlerStatus::Finished
    }

    async fn apply_supersede(
        &self,
        out: &ResponseSender,
        ctx: &CommandContext,
        article: Article,
        superseded: &MessageId,
    ) -> HandlerStatus {
        match with_retry(|| ctx.storage.delete(superseded)).await {
            Ok(()) => {}
            Err(StorageError::NoSuchArticle(_)) => {
                debug!("superseded article {} not present", superseded);
            }
            Err(e) => {
                warn!("supersede delete of {} failed: {}", superseded, e);
                out.send_line(responses::INTERNAL_ERROR);
                return HandlerStatus::Finished;
            }
        }

        if let Err(e) = with_retry(|| ctx.storage.store(article.clone())).await {
            warn!("storing superseding article failed: {}", e);
            out.send_line(responses::INTERNAL_ERROR);
            return HandlerStatus::Finished;
        }

        info!("article {} replaced by {}", superseded, article.message_id);
        out.send_line(responses::REPLACED);
        HandlerStatus::Finished
    }
}

impl Default for PostHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for PostHandler {
    async fn on_line(
        &mut self,
        _session: &mut Session,
        out: &ResponseSender,
        ctx: &CommandContext,
        line: &ProtocolLine,
    ) -> Result<HandlerStatus> {
        match self.state {
            PostState::AwaitCommand => {
                let text = line.text();
                if text.trim().eq_ignore_ascii_case("POST") {
                    out.send_line(responses::SEND_ARTICLE);
                    self.state = PostState::ReadingHeaders;
                    Ok(HandlerStatus::Continue)
                } else {
                    out.send_line(responses::INVALID_USAGE);
                    Ok(HandlerStatus::Finished)
                }
            }
            PostState::ReadingHeaders => {
                let bytes = line.as_bytes();
                if bytes.is_empty() || bytes == b"." {
                    let headers = match Headers::parse(&self.header_text) {
                        Ok(headers) => headers,
                        Err(e) => {
                            debug!("header parse failed: {}", e);
                            out.send_line(responses::POSTING_FAILED);
                            return Ok(HandlerStatus::Finished);
                        }
                    };
                    if bytes == b"." {
                        // Terminator straight after headers: empty body
                        return Ok(self.finish(out, ctx, headers).await);
                    }
                    self.headers = Some(headers);
                    self.state = PostState::ReadingBody;
                    Ok(HandlerStatus::Continue)
                } else {
                    self.header_text.push_str(&line.text());
                    self.header_text.push('\n');
                    if self.accumulated() > ctx.max_article_size {
                        out.send_line(responses::ARTICLE_TOO_LONG);
                        return Ok(HandlerStatus::Finished);
                    }
                    Ok(HandlerStatus::Continue)
                }
            }
            PostState::ReadingBody => {
                let bytes = line.as_bytes();
                if bytes == b"." {
                    let headers = self.headers.take().unwrap_or_default();
                    return Ok(self.finish(out, ctx, headers).await);
                }

                self.body.put_slice(dot_unstuff(bytes));
                self.body.put_slice(b"\r\n");
                if self.accumulated() > ctx.max_article_size {
                    out.send_line(responses::ARTICLE_TOO_LONG);
                    return Ok(HandlerStatus::Finished);
                }
                Ok(HandlerStatus::Continue)
            }
        }
    }
}

/// Extract the target of a `cancel <message-id>` control directive
fn parse_cancel(directive: &str) -> Option<MessageId> {
    let mut tokens = directive.split_ascii_whitespace();
    if !tokens.next()?.eq_ignore_ascii_case("cancel") {
        return None;
    }
    MessageId::new(tokens.next()?).ok()
}
