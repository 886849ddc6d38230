//! In-memory [`SessionStore`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::row_count;
use crate::domain::ports::{SessionRecord, SessionStore, SessionStoreError};

/// Session records held in a process-local map.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    records: Arc<Mutex<HashMap<String, SessionRecord>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, expired or not.
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// True when no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, SessionRecord>> {
        // A panic while holding the lock cannot leave a half-written record.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn find(&self, token_hash: &str) -> Result<Option<SessionRecord>, SessionStoreError> {
        Ok(self.records().get(token_hash).cloned())
    }

    async fn save(
        &self,
        token_hash: &str,
        record: &SessionRecord,
    ) -> Result<(), SessionStoreError> {
        self.records()
            .insert(token_hash.to_owned(), record.clone());
        Ok(())
    }

    async fn delete(&self, token_hash: &str) -> Result<(), SessionStoreError> {
        self.records().remove(token_hash);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError> {
        let mut records = self.records();
        let before = records.len();
        records.retain(|_, record| record.expiry > now);
        Ok(row_count(before - records.len()))
    }
}
