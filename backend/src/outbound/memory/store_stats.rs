//! [`StoreStats`] over the in-memory adapters.

use async_trait::async_trait;

use super::{MemorySessionStore, MemoryTodoStore, row_count};
use crate::domain::ports::{StoreCounts, StoreStats, StoreStatsError};

/// Counts rows held by the in-memory store and session map.
#[derive(Debug, Clone)]
pub struct MemoryStoreStats {
    store: MemoryTodoStore,
    sessions: MemorySessionStore,
}

impl MemoryStoreStats {
    /// Sample the given stores.
    pub fn new(store: MemoryTodoStore, sessions: MemorySessionStore) -> Self {
        Self { store, sessions }
    }
}

#[async_trait]
impl StoreStats for MemoryStoreStats {
    async fn counts(&self) -> Result<StoreCounts, StoreStatsError> {
        let (users, lists, items) = self.store.row_counts().await;
        Ok(StoreCounts {
            users,
            lists,
            items,
            sessions: row_count(self.sessions.len()),
        })
    }
}
