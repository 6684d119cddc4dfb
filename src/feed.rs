//! Peer-feed replication collaborator
//!
//! The posting path hands accepted articles here and moves on; delivery to
//! remote peers happens elsewhere. Enqueueing must never block, so the
//! channel is unbounded and the trait is synchronous.

use crate::protocol::Article;
use tokio::sync::mpsc;
use tracing::debug;

/// Outbound replication hook consumed by the POST handler
pub trait PeerFeed: Send + Sync {
    /// Queue an accepted article for replication to peers (fire-and-forget)
    fn enqueue(&self, article: Article);
}

/// Feed backed by an unbounded channel to a drain task
#[derive(Debug, Clone)]
pub struct ChannelFeed {
    tx: mpsc::UnboundedSender<Article>,
}

impl ChannelFeed {
    /// Create a feed and the receiving end the replication task drains
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Article>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PeerFeed for ChannelFeed {
    fn enqueue(&self, article: Article) {
        // A dropped receiver means replication is shut down; posting
        // must still succeed locally.
        if self.tx.send(article).is_err() {
            debug!("peer feed receiver gone, dropping outbound article");
        }
    }
}

/// Feed that discards everything; used when replication is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFeed;

impl PeerFeed for NoopFeed {
    fn enqueue(&self, article: Article) {
        debug!(
            "replication disabled, not forwarding {}",
            article.message_id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Headers;
    use crate::types::MessageId;
    use bytes::Bytes;

    fn article() -> Article {
        Article::new(
            MessageId::new("<f@x>").unwrap(),
            Headers::parse("Newsgroups: local.test").unwrap(),
            Bytes::from_static(b"body"),
        )
    }

    #[tokio::test]
    async fn test_channel_feed_delivers() {
        let (feed, mut rx) = ChannelFeed::new();
        feed.enqueue(article());
        let received = rx.recv().await.unwrap();
        assert_eq!(received.message_id.as_str(), "<f@x>");
    }

    #[tokio::test]
    async fn test_enqueue_survives_dropped_receiver() {
        let (feed, rx) = ChannelFeed::new();
        drop(rx);
        // Must not panic or block
        feed.enqueue(article());
    }
}
