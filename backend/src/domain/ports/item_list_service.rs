//! Driving port for list and item use-cases.
//!
//! Every operation receives the acting identity explicitly. `None` is an
//! anonymous caller and is always rejected.

use async_trait::async_trait;

use crate::domain::{
    Error, Item, ItemFilter, ItemId, ItemUpdate, List, ListFilter, ListId, ListUpdate, NewItem,
    NewList, User,
};

/// List and item operations scoped to the acting user.
#[async_trait]
pub trait ItemListService: Send + Sync {
    /// Create a list owned by the acting user.
    async fn create_list(&self, identity: Option<&User>, new_list: NewList)
    -> Result<List, Error>;

    /// Fetch one list with its items.
    ///
    /// A list owned by someone else is unauthorised rather than missing.
    async fn find_list_by_id(&self, identity: Option<&User>, id: ListId) -> Result<List, Error>;

    /// Lists matching `filter`, each with its items.
    ///
    /// Any matching row owned by someone else fails the whole read, so
    /// callers listing their own lists filter by owner.
    async fn find_lists(
        &self,
        identity: Option<&User>,
        filter: ListFilter,
    ) -> Result<Vec<List>, Error>;

    /// Apply a partial update to a list.
    async fn update_list(
        &self,
        identity: Option<&User>,
        id: ListId,
        update: ListUpdate,
    ) -> Result<List, Error>;

    /// Delete a list owned by the acting user.
    async fn delete_list(&self, identity: Option<&User>, id: ListId) -> Result<(), Error>;

    /// Add an item to a list. The item's owner is the list's owner.
    async fn create_item(
        &self,
        identity: Option<&User>,
        list_id: ListId,
        new_item: NewItem,
    ) -> Result<Item, Error>;

    /// Fetch one item.
    async fn find_item_by_id(&self, identity: Option<&User>, id: ItemId) -> Result<Item, Error>;

    /// Items matching `filter`.
    async fn find_items(
        &self,
        identity: Option<&User>,
        filter: ItemFilter,
    ) -> Result<Vec<Item>, Error>;

    /// Apply a partial update to an item.
    async fn update_item(
        &self,
        identity: Option<&User>,
        id: ItemId,
        update: ItemUpdate,
    ) -> Result<Item, Error>;

    /// Delete an item owned by the acting user.
    async fn delete_item(&self, identity: Option<&User>, id: ItemId) -> Result<(), Error>;
}
