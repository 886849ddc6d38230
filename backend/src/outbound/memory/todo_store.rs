//! Copy-on-write in-memory implementation of [`TodoStore`].
//!
//! A transaction holds the store lock for its whole lifetime and works on a
//! private copy of the tables. Commit swaps the copy in; rollback or drop
//! throws it away. Transactions are therefore fully serialised.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::row_count;
use crate::domain::ports::{StoreError, StoreTransaction, TodoStore};
use crate::domain::{
    Item, ItemFilter, ItemId, List, ListFilter, ListId, User, UserFilter, UserId,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    lists: BTreeMap<ListId, List>,
    items: BTreeMap<ItemId, Item>,
    last_user_id: i64,
    last_list_id: i64,
    last_item_id: i64,
}

impl Tables {
    fn ensure_unique_user(&self, candidate: &User) -> Result<(), StoreError> {
        let lowered = candidate.name.to_lowercase();
        let clash = self.users.values().find(|user| {
            user.id != candidate.id
                && (user.name.to_lowercase() == lowered
                    || user.api_key.expose() == candidate.api_key.expose())
        });
        match clash {
            Some(user) => Err(StoreError::unique_violation(format!(
                "user {} collides on name or api key",
                user.id
            ))),
            None => Ok(()),
        }
    }
}

/// Process-local store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTodoStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryTodoStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed row counts as `(users, lists, items)`.
    pub async fn row_counts(&self) -> (u64, u64, u64) {
        let tables = self.tables.lock().await;
        (
            row_count(tables.users.len()),
            row_count(tables.lists.len()),
            row_count(tables.items.len()),
        )
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn insert_user(&mut self, user: &User) -> Result<UserId, StoreError> {
        let id = UserId::new(self.working.last_user_id + 1);
        let row = User {
            id,
            ..user.clone()
        };
        self.working.ensure_unique_user(&row)?;
        self.working.last_user_id = id.get();
        self.working.users.insert(id, row);
        Ok(id)
    }

    async fn find_users(&mut self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        Ok(filter.page.apply(
            self.working
                .users
                .values()
                .filter(|user| filter.matches(user))
                .cloned(),
        ))
    }

    async fn update_user(&mut self, user: &User) -> Result<u64, StoreError> {
        if !self.working.users.contains_key(&user.id) {
            return Ok(0);
        }
        self.working.ensure_unique_user(user)?;
        if let Some(row) = self.working.users.get_mut(&user.id) {
            row.name.clone_from(&user.name);
            row.email.clone_from(&user.email);
            row.updated_at = user.updated_at;
        }
        Ok(1)
    }

    async fn delete_user(&mut self, id: UserId) -> Result<u64, StoreError> {
        if self.working.users.remove(&id).is_none() {
            return Ok(0);
        }
        self.working.lists.retain(|_, list| list.user_id != id);
        self.working.items.retain(|_, item| item.user_id != id);
        Ok(1)
    }

    async fn insert_list(&mut self, list: &List) -> Result<ListId, StoreError> {
        if !self.working.users.contains_key(&list.user_id) {
            return Err(StoreError::query(format!(
                "list owner {} does not exist",
                list.user_id
            )));
        }
        let id = ListId::new(self.working.last_list_id + 1);
        self.working.last_list_id = id.get();
        self.working.lists.insert(
            id,
            List {
                id,
                items: Vec::new(),
                ..list.clone()
            },
        );
        Ok(id)
    }

    async fn find_lists(&mut self, filter: &ListFilter) -> Result<Vec<List>, StoreError> {
        Ok(filter.page.apply(
            self.working
                .lists
                .values()
                .filter(|list| filter.matches(list))
                .cloned(),
        ))
    }

    async fn update_list(&mut self, list: &List) -> Result<u64, StoreError> {
        match self.working.lists.get_mut(&list.id) {
            Some(row) if row.user_id == list.user_id => {
                row.name.clone_from(&list.name);
                row.completed = list.completed;
                row.updated_at = list.updated_at;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_list(&mut self, id: ListId, owner: UserId) -> Result<u64, StoreError> {
        match self.working.lists.get(&id) {
            Some(row) if row.user_id == owner => {
                self.working.lists.remove(&id);
                self.working.items.retain(|_, item| item.list_id != id);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn insert_item(&mut self, item: &Item) -> Result<ItemId, StoreError> {
        if !self.working.lists.contains_key(&item.list_id) {
            return Err(StoreError::query(format!(
                "parent list {} does not exist",
                item.list_id
            )));
        }
        let id = ItemId::new(self.working.last_item_id + 1);
        self.working.last_item_id = id.get();
        self.working.items.insert(
            id,
            Item {
                id,
                ..item.clone()
            },
        );
        Ok(id)
    }

    async fn find_items(&mut self, filter: &ItemFilter) -> Result<Vec<Item>, StoreError> {
        Ok(filter.page.apply(
            self.working
                .items
                .values()
                .filter(|item| filter.matches(item))
                .cloned(),
        ))
    }

    async fn update_item(&mut self, item: &Item) -> Result<u64, StoreError> {
        match self.working.items.get_mut(&item.id) {
            Some(row) if row.user_id == item.user_id => {
                row.name.clone_from(&item.name);
                row.completed = item.completed;
                row.updated_at = item.updated_at;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_item(&mut self, id: ItemId, owner: UserId) -> Result<u64, StoreError> {
        match self.working.items.get(&id) {
            Some(row) if row.user_id == owner => {
                self.working.items.remove(&id);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let Self { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
