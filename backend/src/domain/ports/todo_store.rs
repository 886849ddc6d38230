//! Transactional store boundary for users, lists and items.
//!
//! Domain services open one [`StoreTransaction`] per logical operation, run
//! every read and write through it, then commit on success or roll back on
//! failure. Dropping a transaction without either also discards its writes;
//! that only happens when a deadline abandons the operation.

use async_trait::async_trait;

use crate::domain::{
    Item, ItemFilter, ItemId, List, ListFilter, ListId, User, UserFilter, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by store adapters.
    pub enum StoreError {
        /// A connection could not be obtained or was lost.
        Connection { message: String } => "store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "store query failed: {message}",
        /// A uniqueness constraint rejected the write.
        UniqueViolation { message: String } => "store uniqueness violated: {message}",
    }
}

/// Factory for units of work.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Open a transaction.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError>;
}

/// One open transaction.
///
/// Mutations that target a single row report the number of rows they
/// touched so callers can turn a miss into a not-found error. List and item
/// updates and deletes always carry the owner in their predicate.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Insert a user and return the assigned id. `user.id` is ignored.
    async fn insert_user(&mut self, user: &User) -> Result<UserId, StoreError>;

    /// Users matching `filter`, ordered by id ascending.
    async fn find_users(&mut self, filter: &UserFilter) -> Result<Vec<User>, StoreError>;

    /// Overwrite name, email and `updated_at` of the user with `user.id`.
    async fn update_user(&mut self, user: &User) -> Result<u64, StoreError>;

    /// Delete a user along with everything they own.
    async fn delete_user(&mut self, id: UserId) -> Result<u64, StoreError>;

    /// Insert a list and return the assigned id. `list.id` and `list.items`
    /// are ignored.
    async fn insert_list(&mut self, list: &List) -> Result<ListId, StoreError>;

    /// Lists matching `filter`, ordered by id ascending, without items.
    async fn find_lists(&mut self, filter: &ListFilter) -> Result<Vec<List>, StoreError>;

    /// Overwrite name, completion and `updated_at` where both `list.id` and
    /// `list.user_id` match.
    async fn update_list(&mut self, list: &List) -> Result<u64, StoreError>;

    /// Delete the list `id` if `owner` owns it.
    async fn delete_list(&mut self, id: ListId, owner: UserId) -> Result<u64, StoreError>;

    /// Insert an item and return the assigned id. `item.id` is ignored.
    async fn insert_item(&mut self, item: &Item) -> Result<ItemId, StoreError>;

    /// Items matching `filter`, ordered by id ascending.
    async fn find_items(&mut self, filter: &ItemFilter) -> Result<Vec<Item>, StoreError>;

    /// Overwrite name, completion and `updated_at` where both `item.id` and
    /// `item.user_id` match.
    async fn update_item(&mut self, item: &Item) -> Result<u64, StoreError>;

    /// Delete the item `id` if `owner` owns it.
    async fn delete_item(&mut self, id: ItemId, owner: UserId) -> Result<u64, StoreError>;

    /// Make every write in this transaction durable.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Discard every write in this transaction.
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
