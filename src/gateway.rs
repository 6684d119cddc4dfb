//! Mailing-list gateway collaborator
//!
//! Postings to list-backed groups are handed to this interface instead of
//! being stored; the SMTP bridge behind it is outside the core.

use crate::protocol::Article;
use crate::storage::Group;
use async_trait::async_trait;
use tracing::warn;

/// Bridge from list-backed newsgroups to their mailing lists
#[async_trait]
pub trait MailingListGateway: Send + Sync {
    /// Route an article to the list behind `group`
    ///
    /// Returns `true` when the article was handed off; `false` leaves the
    /// group ineligible for this posting.
    async fn route_to_list(&self, article: &Article, group: &Group) -> bool;
}

/// Gateway stub that refuses everything; used when no bridge is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGateway;

#[async_trait]
impl MailingListGateway for NoopGateway {
    async fn route_to_list(&self, article: &Article, group: &Group) -> bool {
        warn!(
            "no mailing-list gateway configured, refusing {} for {}",
            article.message_id, group.name
        );
        false
    }
}
