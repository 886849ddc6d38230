//! Shared wiring for the store-backed service tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rstest::fixture;

use super::item_list_service::StoreItemListService;
use super::ports::{ItemListService, StoreError, StoreTransaction, TodoStore, UserService};
use super::store_context::StoreContext;
use super::user_service::StoreUserService;
use super::{
    Item, ItemFilter, ItemId, List, ListFilter, ListId, NewList, NewUser, User, UserFilter,
    UserId,
};
use crate::outbound::memory::MemoryTodoStore;
use crate::test_support::MutableClock;

/// How the transactions opened through a [`TallyingStore`] ended.
#[derive(Clone, Default)]
pub(crate) struct Tally {
    commits: Arc<AtomicUsize>,
    rollbacks: Arc<AtomicUsize>,
}

impl Tally {
    pub(crate) fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub(crate) fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

/// Memory store that counts commits and rollbacks.
struct TallyingStore {
    inner: MemoryTodoStore,
    tally: Tally,
}

#[async_trait]
impl TodoStore for TallyingStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        Ok(Box::new(TallyingTransaction {
            inner: self.inner.begin().await?,
            tally: self.tally.clone(),
        }))
    }
}

struct TallyingTransaction {
    inner: Box<dyn StoreTransaction>,
    tally: Tally,
}

#[async_trait]
impl StoreTransaction for TallyingTransaction {
    async fn insert_user(&mut self, user: &User) -> Result<UserId, StoreError> {
        self.inner.insert_user(user).await
    }

    async fn find_users(&mut self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        self.inner.find_users(filter).await
    }

    async fn update_user(&mut self, user: &User) -> Result<u64, StoreError> {
        self.inner.update_user(user).await
    }

    async fn delete_user(&mut self, id: UserId) -> Result<u64, StoreError> {
        self.inner.delete_user(id).await
    }

    async fn insert_list(&mut self, list: &List) -> Result<ListId, StoreError> {
        self.inner.insert_list(list).await
    }

    async fn find_lists(&mut self, filter: &ListFilter) -> Result<Vec<List>, StoreError> {
        self.inner.find_lists(filter).await
    }

    async fn update_list(&mut self, list: &List) -> Result<u64, StoreError> {
        self.inner.update_list(list).await
    }

    async fn delete_list(&mut self, id: ListId, owner: UserId) -> Result<u64, StoreError> {
        self.inner.delete_list(id, owner).await
    }

    async fn insert_item(&mut self, item: &Item) -> Result<ItemId, StoreError> {
        self.inner.insert_item(item).await
    }

    async fn find_items(&mut self, filter: &ItemFilter) -> Result<Vec<Item>, StoreError> {
        self.inner.find_items(filter).await
    }

    async fn update_item(&mut self, item: &Item) -> Result<u64, StoreError> {
        self.inner.update_item(item).await
    }

    async fn delete_item(&mut self, id: ItemId, owner: UserId) -> Result<u64, StoreError> {
        self.inner.delete_item(id, owner).await
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tally.commits.fetch_add(1, Ordering::SeqCst);
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tally.rollbacks.fetch_add(1, Ordering::SeqCst);
        self.inner.rollback().await
    }
}

pub(crate) struct Harness {
    pub(crate) store: MemoryTodoStore,
    pub(crate) tally: Tally,
    pub(crate) clock: Arc<MutableClock>,
    pub(crate) users: StoreUserService,
    pub(crate) lists: StoreItemListService,
}

impl Harness {
    pub(crate) async fn user(&self, name: &str) -> User {
        self.users
            .create_user(NewUser::new(name))
            .await
            .expect("create user")
    }

    pub(crate) async fn list(&self, owner: &User, name: &str) -> List {
        self.lists
            .create_list(Some(owner), NewList::new(name))
            .await
            .expect("create list")
    }
}

#[fixture]
pub(crate) fn harness() -> Harness {
    let store = MemoryTodoStore::new();
    let tally = Tally::default();
    let clock = Arc::new(MutableClock::fixed());
    let tallying = TallyingStore {
        inner: store.clone(),
        tally: tally.clone(),
    };
    let context = StoreContext::new(Arc::new(tallying), clock.clone());
    Harness {
        users: StoreUserService::new(context.clone()),
        lists: StoreItemListService::new(context),
        store,
        tally,
        clock,
    }
}
