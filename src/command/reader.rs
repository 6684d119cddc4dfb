//! Reader-side handlers: GROUP, ARTICLE/HEAD/BODY/STAT, NEXT/LAST

use super::handler::{CommandContext, CommandHandler, HandlerStatus};
use super::arguments;
use crate::protocol::{
    codes, parse_article_spec, parse_group_name, responses, Article, ArticleSpec, ProtocolLine,
};
use crate::server::handle::ResponseSender;
use crate::session::Session;
use crate::storage::{with_retry, StorageError};
use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

/// GROUP: select a newsgroup (RFC 3977 §6.1.1)
pub struct GroupHandler;

#[async_trait]
impl CommandHandler for GroupHandler {
    async fn on_line(
        &mut self,
        session: &mut Session,
        out: &ResponseSender,
        ctx: &CommandContext,
        line: &ProtocolLine,
    ) -> Result<HandlerStatus> {
        let args = arguments(line);
        let Some(name) = parse_group_name(&args) else {
            out.send_line(responses::INVALID_USAGE);
            return Ok(HandlerStatus::Finished);
        };

        match with_retry(|| ctx.storage.resolve_group(name)).await {
            Ok(Some(group)) if !group.deleted => {
                session.select_group(&group.name, group.low, group.high);
                out.send_line(&format!(
                    "{} {} {} {} {}",
                    codes::GROUP_SELECTED,
                    group.count,
                    group.low,
                    group.high,
                    group.name
                ));
            }
            // Deleted groups stay resolvable for cleanup but are not
            // selectable, matching the posting path's skip rule
            Ok(_) => out.send_line(responses::NO_SUCH_GROUP),
            Err(e) => {
                warn!("group resolution failed for {}: {}", name, e);
                out.send_line(responses::INTERNAL_ERROR);
            }
        }
        Ok(HandlerStatus::Finished)
    }
}

/// Which portion of the article a retrieval command returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieveMode {
    Article,
    Head,
    Body,
    Stat,
}

impl RetrieveMode {
    const fn code(self) -> u16 {
        match self {
            Self::Article => codes::ARTICLE_FOLLOWS,
            Self::Head => codes::HEAD_FOLLOWS,
            Self::Body => codes::BODY_FOLLOWS,
            Self::Stat => codes::ARTICLE_EXISTS,
        }
    }
}

/// ARTICLE/HEAD/BODY/STAT over message-id, number, or the session cursor
pub struct ArticleHandler {
    mode: RetrieveMode,
}

impl ArticleHandler {
    #[must_use]
    pub fn new(mode: RetrieveMode) -> Self {
        Self { mode }
    }

    fn reply(&self, out: &ResponseSender, number: u64, article: &Article) {
        let status = format!("{} {} {}", self.mode.code(), number, article.message_id);
        match self.mode {
            RetrieveMode::Stat => out.send_line(&status),
            RetrieveMode::Head => out.send_multiline(&status, head_lines(article)),
            RetrieveMode::Body => out.send_multiline(&status, body_lines(&article.body)),
            RetrieveMode::Article => {
                let mut payload = head_lines(article);
                payload.push(Vec::new());
                payload.extend(body_lines(&article.body));
                out.send_multiline(&status, payload);
            }
        }
    }
}

#[async_trait]
impl CommandHandler for ArticleHandler {
    async fn on_line(
        &mut self,
        session: &mut Session,
        out: &ResponseSender,
        ctx: &CommandContext,
        line: &ProtocolLine,
    ) -> Result<HandlerStatus> {
        let args = arguments(line);
        let Some(spec) = parse_article_spec(&args) else {
            out.send_line(responses::INVALID_USAGE);
            return Ok(HandlerStatus::Finished);
        };

        match spec {
            ArticleSpec::ByMessageId(id) => {
                match with_retry(|| ctx.storage.fetch(&id)).await {
                    // Number 0 when no group context is implied (RFC 3977 §6.2.1)
                    Ok(Some(article)) => self.reply(out, 0, &article),
                    Ok(None) => out.send_line(responses::NO_SUCH_ARTICLE),
                    Err(e) => reply_backend_error(out, &e),
                }
            }
            ArticleSpec::ByNumber(number) => {
                let Some(group) = session.group.clone() else {
                    out.send_line(responses::NO_GROUP_SELECTED);
                    return Ok(HandlerStatus::Finished);
                };
                match with_retry(|| ctx.storage.fetch_by_number(&group.name, number)).await {
                    Ok(Some(article)) => {
                        session.current_article = Some(number);
                        self.reply(out, number, &article);
                    }
                    Ok(None) => out.send_line(responses::NO_SUCH_ARTICLE_NUMBER),
                    Err(e) => reply_backend_error(out, &e),
                }
            }
            ArticleSpec::Current => {
                let Some(group) = session.group.clone() else {
                    out.send_line(responses::NO_GROUP_SELECTED);
                    return Ok(HandlerStatus::Finished);
                };
                let Some(number) = session.current_article else {
                    out.send_line(responses::NO_CURRENT_ARTICLE);
                    return Ok(HandlerStatus::Finished);
                };
                match with_retry(|| ctx.storage.fetch_by_number(&group.name, number)).await {
                    Ok(Some(article)) => self.reply(out, number, &article),
                    Ok(None) => out.send_line(responses::NO_CURRENT_ARTICLE),
                    Err(e) => reply_backend_error(out, &e),
                }
            }
        }
        Ok(HandlerStatus::Finished)
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

/// NEXT/LAST: move the article cursor (RFC 3977 §6.1.3, §6.1.4)
pub struct NavigateHandler {
    direction: Direction,
}

impl NavigateHandler {
    #[must_use]
    pub fn next() -> Self {
        Self {
            direction: Direction::Forward,
        }
    }

    #[must_use]
    pub fn last() -> Self {
        Self {
            direction: Direction::Backward,
        }
    }
}

#[async_trait]
impl CommandHandler for NavigateHandler {
    async fn on_line(
        &mut self,
        session: &mut Session,
        out: &ResponseSender,
        ctx: &CommandContext,
        _line: &ProtocolLine,
    ) -> Result<HandlerStatus> {
        let Some(group) = session.group.clone() else {
            out.send_line(responses::NO_GROUP_SELECTED);
            return Ok(HandlerStatus::Finished);
        };
        let Some(current) = session.current_article else {
            out.send_line(responses::NO_CURRENT_ARTICLE);
            return Ok(HandlerStatus::Finished);
        };

        // Re-resolve so the scan sees the group's current high mark
        let (low, high) = match with_retry(|| ctx.storage.resolve_group(&group.name)).await {
            Ok(Some(g)) => (g.low, g.high),
            Ok(None) => {
                out.send_line(responses::NO_GROUP_SELECTED);
                return Ok(HandlerStatus::Finished);
            }
            Err(e) => {
                reply_backend_error(out, &e);
                return Ok(HandlerStatus::Finished);
            }
        };

        let candidates: Vec<u64> = match self.direction {
            Direction::Forward => (current + 1..=high).collect(),
            Direction::Backward => (low..current).rev().collect(),
        };

        for number in candidates {
            match with_retry(|| ctx.storage.fetch_by_number(&group.name, number)).await {
                Ok(Some(article)) => {
                    session.current_article = Some(number);
                    out.send_line(&format!(
                        "{} {} {}",
                        codes::ARTICLE_EXISTS,
                        number,
                        article.message_id
                    ));
                    return Ok(HandlerStatus::Finished);
                }
                Ok(None) => continue,
                Err(e) => {
                    reply_backend_error(out, &e);
                    return Ok(HandlerStatus::Finished);
                }
            }
        }

        out.send_line(match self.direction {
            Direction::Forward => responses::NO_NEXT_ARTICLE,
            Direction::Backward => responses::NO_PREV_ARTICLE,
        });
        Ok(HandlerStatus::Finished)
    }
}

fn reply_backend_error(out: &ResponseSender, error: &StorageError) {
    warn!("storage failure: {}", error);
    out.send_line(responses::INTERNAL_ERROR);
}

fn head_lines(article: &Article) -> Vec<Vec<u8>> {
    article
        .headers
        .wire_lines()
        .map(String::into_bytes)
        .collect()
}

/// Split a stored body into payload lines for the multi-line writer
fn body_lines(body: &[u8]) -> Vec<Vec<u8>> {
    if body.is_empty() {
        return Vec::new();
    }
    let mut lines: Vec<Vec<u8>> = body
        .split(|&b| b == b'\n')
        .map(|l| l.strip_suffix(b"\r").unwrap_or(l).to_vec())
        .collect();
    // A terminator on the final line produces one empty trailing split
    if lines.last().is_some_and(Vec::is_empty) {
        lines.pop();
    }
    lines
}
