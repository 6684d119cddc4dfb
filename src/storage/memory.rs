//! In-memory article store over DashMap
//!
//! Backs the binary and the test suite. Group indexes map article numbers
//! to message-ids; numbering is assigned at store time and never reused.

use super::{Group, Storage, StorageError};
use crate::protocol::Article;
use crate::types::MessageId;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct GroupState {
    /// Article number -> message-id, ordered for low/high derivation
    index: BTreeMap<u64, MessageId>,
    next_number: u64,
    list_address: Option<String>,
    deleted: bool,
}

impl GroupState {
    fn new() -> Self {
        Self {
            next_number: 1,
            ..Default::default()
        }
    }

    fn to_group(&self, name: &str) -> Group {
        Group {
            name: name.to_string(),
            low: self.index.keys().next().copied().unwrap_or(0),
            high: self.next_number.saturating_sub(1),
            count: self.index.len() as u64,
            list_address: self.list_address.clone(),
            deleted: self.deleted,
        }
    }
}

/// Thread-safe in-memory storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    articles: DashMap<MessageId, Article>,
    groups: DashMap<String, Mutex<GroupState>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group so clients can select and post to it
    pub fn create_group(&self, name: &str) {
        self.groups
            .entry(name.to_string())
            .or_insert_with(|| Mutex::new(GroupState::new()));
    }

    /// Create a group whose postings route through the mailing-list gateway
    pub fn create_list_group(&self, name: &str, list_address: &str) {
        let state = self
            .groups
            .entry(name.to_string())
            .or_insert_with(|| Mutex::new(GroupState::new()));
        state.lock().unwrap().list_address = Some(list_address.to_string());
    }

    /// Mark a group deleted; it stops accepting postings but keeps its name
    pub fn mark_group_deleted(&self, name: &str) {
        if let Some(state) = self.groups.get(name) {
            state.lock().unwrap().deleted = true;
        }
    }

    /// Number of stored articles (test observability)
    #[must_use]
    pub fn article_count(&self) -> usize {
        self.articles.len()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn article_exists(&self, id: &MessageId) -> Result<bool, StorageError> {
        Ok(self.articles.contains_key(id))
    }

    async fn store(&self, article: Article) -> Result<(), StorageError> {
        let id = article.message_id.clone();
        for name in article.newsgroups() {
            let state = self
                .groups
                .entry(name.to_string())
                .or_insert_with(|| Mutex::new(GroupState::new()));
            let mut state = state.lock().unwrap();
            let number = state.next_number;
            state.next_number += 1;
            state.index.insert(number, id.clone());
        }
        self.articles.insert(id, article);
        Ok(())
    }

    async fn delete(&self, id: &MessageId) -> Result<(), StorageError> {
        if self.articles.remove(id).is_none() {
            return Err(StorageError::NoSuchArticle(id.to_string()));
        }
        for entry in self.groups.iter() {
            let mut state = entry.value().lock().unwrap();
            state.index.retain(|_, stored| *stored != *id);
        }
        Ok(())
    }

    async fn resolve_group(&self, name: &str) -> Result<Option<Group>, StorageError> {
        Ok(self
            .groups
            .get(name)
            .map(|state| state.lock().unwrap().to_group(name)))
    }

    async fn fetch(&self, id: &MessageId) -> Result<Option<Article>, StorageError> {
        Ok(self.articles.get(id).map(|a| a.value().clone()))
    }

    async fn fetch_by_number(
        &self,
        group: &str,
        number: u64,
    ) -> Result<Option<Article>, StorageError> {
        let Some(state) = self.groups.get(group) else {
            return Ok(None);
        };
        let id = state.lock().unwrap().index.get(&number).cloned();
        drop(state);
        match id {
            Some(id) => Ok(self.articles.get(&id).map(|a| a.value().clone())),
            None => Ok(None),
        }
    }
}
