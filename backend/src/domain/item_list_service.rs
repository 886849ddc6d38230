//! List and item use-cases.
//!
//! Ownership rules:
//! - every operation requires a validated acting identity;
//! - reads fail as unauthorised when any matching row belongs to someone
//!   else, so a direct lookup of a foreign list surfaces as unauthorised
//!   while an owner-filtered listing simply never sees it;
//! - updates and deletes carry the owner in the store predicate, and a
//!   predicate that matches nothing is reported as not found;
//! - an item's owner is copied from its parent list.

use async_trait::async_trait;
use tracing::{info, warn};

use super::identity::{require_authenticated, unauthorized};
use super::ports::{ItemListService, StoreTransaction};
use super::store_context::{StoreContext, expect_rows, finish, store_failure};
use super::{
    Error, Item, ItemFilter, ItemId, ItemUpdate, List, ListFilter, ListId, ListUpdate, NewItem,
    NewList, User,
};
use chrono::{DateTime, Utc};

/// [`ItemListService`] backed by the transactional store.
#[derive(Clone)]
pub struct StoreItemListService {
    context: StoreContext,
}

impl StoreItemListService {
    /// Create the service.
    pub fn new(context: StoreContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl ItemListService for StoreItemListService {
    async fn create_list(
        &self,
        identity: Option<&User>,
        new_list: NewList,
    ) -> Result<List, Error> {
        let user = require_authenticated(identity)?;
        self.context
            .bounded("create_list", async {
                let mut tx = self.context.begin().await?;
                let outcome = insert_list(tx.as_mut(), user, new_list, self.context.now()).await;
                let list = finish(tx, outcome).await?;
                info!(user_id = %user.id, list_id = %list.id, "created list");
                Ok(list)
            })
            .await
    }

    async fn find_list_by_id(&self, identity: Option<&User>, id: ListId) -> Result<List, Error> {
        let user = require_authenticated(identity)?;
        self.context
            .bounded("find_list_by_id", async {
                let mut tx = self.context.begin().await?;
                let outcome = find_list(tx.as_mut(), user, id).await;
                finish(tx, outcome).await
            })
            .await
    }

    async fn find_lists(
        &self,
        identity: Option<&User>,
        filter: ListFilter,
    ) -> Result<Vec<List>, Error> {
        let user = require_authenticated(identity)?;
        self.context
            .bounded("find_lists", async {
                let mut tx = self.context.begin().await?;
                let outcome = find_lists(tx.as_mut(), user, &filter).await;
                finish(tx, outcome).await
            })
            .await
    }

    async fn update_list(
        &self,
        identity: Option<&User>,
        id: ListId,
        update: ListUpdate,
    ) -> Result<List, Error> {
        let user = require_authenticated(identity)?;
        self.context
            .bounded("update_list", async {
                let mut tx = self.context.begin().await?;
                let outcome = async {
                    let mut list = find_list(tx.as_mut(), user, id).await?;
                    list.apply(&update);
                    list.updated_at = self.context.now();
                    list.validate()?;
                    let rows = tx.update_list(&list).await.map_err(store_failure)?;
                    expect_rows(rows, || list_not_found(id))?;
                    Ok::<_, Error>(list)
                }
                .await;
                finish(tx, outcome).await
            })
            .await
    }

    async fn delete_list(&self, identity: Option<&User>, id: ListId) -> Result<(), Error> {
        let user = require_authenticated(identity)?;
        if !id.is_assigned() {
            return Err(Error::invalid("invalid id"));
        }
        self.context
            .bounded("delete_list", async {
                let mut tx = self.context.begin().await?;
                let outcome = tx
                    .delete_list(id, user.id)
                    .await
                    .map_err(store_failure)
                    .and_then(|rows| {
                        expect_rows(rows, || {
                            Error::not_found(format!("could not delete list with id {id}"))
                        })
                    });
                finish(tx, outcome).await
            })
            .await
    }

    async fn create_item(
        &self,
        identity: Option<&User>,
        list_id: ListId,
        new_item: NewItem,
    ) -> Result<Item, Error> {
        let user = require_authenticated(identity)?;
        self.context
            .bounded("create_item", async {
                let mut tx = self.context.begin().await?;
                let outcome = async {
                    let list = find_list(tx.as_mut(), user, list_id).await?;
                    let now = self.context.now();
                    let mut item = Item {
                        id: ItemId::default(),
                        user_id: list.user_id,
                        list_id: list.id,
                        name: new_item.name,
                        completed: new_item.completed,
                        created_at: now,
                        updated_at: now,
                    };
                    item.validate()?;
                    item.id = tx.insert_item(&item).await.map_err(store_failure)?;
                    Ok::<_, Error>(item)
                }
                .await;
                finish(tx, outcome).await
            })
            .await
    }

    async fn find_item_by_id(&self, identity: Option<&User>, id: ItemId) -> Result<Item, Error> {
        let user = require_authenticated(identity)?;
        self.context
            .bounded("find_item_by_id", async {
                let mut tx = self.context.begin().await?;
                let outcome = find_item(tx.as_mut(), user, id).await;
                finish(tx, outcome).await
            })
            .await
    }

    async fn find_items(
        &self,
        identity: Option<&User>,
        filter: ItemFilter,
    ) -> Result<Vec<Item>, Error> {
        let user = require_authenticated(identity)?;
        self.context
            .bounded("find_items", async {
                let mut tx = self.context.begin().await?;
                let outcome = find_items(tx.as_mut(), user, &filter).await;
                finish(tx, outcome).await
            })
            .await
    }

    async fn update_item(
        &self,
        identity: Option<&User>,
        id: ItemId,
        update: ItemUpdate,
    ) -> Result<Item, Error> {
        let user = require_authenticated(identity)?;
        self.context
            .bounded("update_item", async {
                let mut tx = self.context.begin().await?;
                let outcome = async {
                    let mut item = find_item(tx.as_mut(), user, id).await?;
                    item.apply(&update);
                    item.updated_at = self.context.now();
                    item.validate()?;
                    let rows = tx.update_item(&item).await.map_err(store_failure)?;
                    expect_rows(rows, || item_not_found(id))?;
                    Ok::<_, Error>(item)
                }
                .await;
                finish(tx, outcome).await
            })
            .await
    }

    async fn delete_item(&self, identity: Option<&User>, id: ItemId) -> Result<(), Error> {
        let user = require_authenticated(identity)?;
        if !id.is_assigned() {
            return Err(Error::invalid("invalid id"));
        }
        self.context
            .bounded("delete_item", async {
                let mut tx = self.context.begin().await?;
                let outcome = tx
                    .delete_item(id, user.id)
                    .await
                    .map_err(store_failure)
                    .and_then(|rows| {
                        expect_rows(rows, || {
                            Error::not_found(format!("could not delete item with id {id}"))
                        })
                    });
                finish(tx, outcome).await
            })
            .await
    }
}

/// Insert a list owned by `owner` inside an open transaction.
pub(crate) async fn insert_list(
    tx: &mut dyn StoreTransaction,
    owner: &User,
    new_list: NewList,
    now: DateTime<Utc>,
) -> Result<List, Error> {
    let mut list = List {
        id: ListId::default(),
        user_id: owner.id,
        name: new_list.name,
        completed: new_list.completed,
        items: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    list.validate()?;
    list.id = tx.insert_list(&list).await.map_err(store_failure)?;
    Ok(list)
}

async fn find_list(tx: &mut dyn StoreTransaction, user: &User, id: ListId) -> Result<List, Error> {
    find_lists(tx, user, &ListFilter::by_id(id))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| list_not_found(id))
}

async fn find_lists(
    tx: &mut dyn StoreTransaction,
    user: &User,
    filter: &ListFilter,
) -> Result<Vec<List>, Error> {
    let mut lists = tx.find_lists(filter).await.map_err(store_failure)?;
    if let Some(foreign) = lists.iter().find(|list| list.user_id != user.id) {
        warn!(user_id = %user.id, list_id = %foreign.id, "read of foreign list rejected");
        return Err(unauthorized());
    }
    for list in &mut lists {
        list.items = find_items(tx, user, &ItemFilter::by_list(list.id)).await?;
    }
    Ok(lists)
}

async fn find_item(tx: &mut dyn StoreTransaction, user: &User, id: ItemId) -> Result<Item, Error> {
    find_items(tx, user, &ItemFilter::by_id(id))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| item_not_found(id))
}

async fn find_items(
    tx: &mut dyn StoreTransaction,
    user: &User,
    filter: &ItemFilter,
) -> Result<Vec<Item>, Error> {
    let items = tx.find_items(filter).await.map_err(store_failure)?;
    if let Some(foreign) = items.iter().find(|item| item.user_id != user.id) {
        warn!(user_id = %user.id, item_id = %foreign.id, "read of foreign item rejected");
        return Err(unauthorized());
    }
    Ok(items)
}

fn list_not_found(id: ListId) -> Error {
    Error::not_found(format!("could not find list with id {id}"))
}

fn item_not_found(id: ItemId) -> Error {
    Error::not_found(format!("could not find item with id {id}"))
}
