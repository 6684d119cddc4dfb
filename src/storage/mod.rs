//! Article storage collaborator interface
//!
//! The core talks to persistence through this narrow trait; indexing and
//! query semantics belong to the backend. [`memory::MemoryStorage`] is the
//! in-process implementation used by the binary and the test suite.

pub mod memory;

use crate::protocol::Article;
use crate::types::MessageId;
use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStorage;

/// Storage errors with a distinguishable backend-failure kind
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageError {
    /// Transient or permanent backend fault (I/O, index corruption, ...).
    /// The dispatch layer retries these once before surfacing them.
    #[error("storage backend failure: {0}")]
    Backend(String),

    /// The referenced article does not exist
    #[error("no such article: {0}")]
    NoSuchArticle(String),
}

impl StorageError {
    /// Whether this error is a backend fault eligible for the single retry
    #[must_use]
    pub const fn is_backend(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

/// A newsgroup as seen by the core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    /// Lowest article number present
    pub low: u64,
    /// Highest article number assigned
    pub high: u64,
    /// Number of articles currently filed
    pub count: u64,
    /// Mailing-list address when this group is list-backed
    pub list_address: Option<String>,
    /// Deleted groups are skipped when routing postings
    pub deleted: bool,
}

impl Group {
    /// Whether postings to this group go through the mailing-list gateway
    #[must_use]
    pub fn is_list_backed(&self) -> bool {
        self.list_address.is_some()
    }
}

/// Narrow persistence interface consumed by the command handlers
#[async_trait]
pub trait Storage: Send + Sync {
    /// Whether an article with this message-id is already stored
    async fn article_exists(&self, id: &MessageId) -> Result<bool, StorageError>;

    /// Store an article, filing it under each group named in its
    /// Newsgroups header (creating numbering as needed)
    async fn store(&self, article: Article) -> Result<(), StorageError>;

    /// Delete an article by message-id from the store and all group indexes
    async fn delete(&self, id: &MessageId) -> Result<(), StorageError>;

    /// Resolve a group by name; `None` when the group is unknown
    async fn resolve_group(&self, name: &str) -> Result<Option<Group>, StorageError>;

    /// Fetch an article by message-id
    async fn fetch(&self, id: &MessageId) -> Result<Option<Article>, StorageError>;

    /// Fetch an article by its number within a group
    async fn fetch_by_number(
        &self,
        group: &str,
        number: u64,
    ) -> Result<Option<Article>, StorageError>;
}

/// Run a storage operation, retrying exactly once on a backend fault
///
/// Absorbs transient backend hiccups without hiding persistent failures;
/// every other error kind surfaces immediately.
pub async fn with_retry<T, F, Fut>(mut op: F) -> Result<T, StorageError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, StorageError>>,
{
    match op().await {
        Err(e) if e.is_backend() => {
            tracing::debug!("retrying storage operation after backend fault: {}", e);
            op().await
        }
        other => other,
    }
}
