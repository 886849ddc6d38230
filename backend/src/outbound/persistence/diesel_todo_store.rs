//! PostgreSQL-backed [`TodoStore`] using Diesel.
//!
//! Each [`StoreTransaction`] owns one pooled connection for its lifetime and
//! drives the transaction manually: `BEGIN` on creation, `COMMIT` or
//! `ROLLBACK` when the domain finishes. A transaction dropped mid-flight
//! returns its connection with the transaction still open; the pool manager
//! sees the connection as broken and closes it, so the server rolls back.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};

use super::error_mapping::{store_error, store_pool_error};
use super::models::{
    ItemChangeset, ItemRow, ListChangeset, ListRow, NewItemRow, NewListRow, NewUserRow,
    UserChangeset, UserRow,
};
use super::pool::{DbPool, OwnedConnection};
use super::query_log::QueryLog;
use super::schema::{items, lists, users};
use crate::domain::ports::{StoreError, StoreTransaction, TodoStore};
use crate::domain::{
    Item, ItemFilter, ItemId, List, ListFilter, ListId, Page, User, UserFilter, UserId,
};

diesel::define_sql_function! {
    fn lower(value: Text) -> Text;
}

diesel::define_sql_function! {
    #[sql_name = "lower"]
    fn lower_nullable(value: Nullable<Text>) -> Nullable<Text>;
}

/// Apply a [`Page`] window to a boxed select.
macro_rules! paginate {
    ($query:expr, $page:expr) => {{
        let mut query = $query;
        let page: Page = $page;
        if let Some(limit) = page.limit() {
            query = query.limit(i64::from(limit));
        }
        if let Some(offset) = page.offset() {
            query = query.offset(i64::from(offset));
        }
        query
    }};
}

/// Diesel-backed store.
#[derive(Clone)]
pub struct DieselTodoStore {
    pool: DbPool,
    log: QueryLog,
}

impl DieselTodoStore {
    /// Create a store drawing connections from `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            log: QueryLog::default(),
        }
    }

    /// Log every store operation with its elapsed time.
    #[must_use]
    pub fn with_query_log(mut self, log: QueryLog) -> Self {
        self.log = log;
        self
    }
}

#[async_trait]
impl TodoStore for DieselTodoStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        let mut conn = self.pool.get_owned().await.map_err(store_pool_error)?;
        self.log
            .run("begin", AnsiTransactionManager::begin_transaction(&mut *conn))
            .await
            .map_err(|err| store_error(err, "begin"))?;
        Ok(Box::new(DieselTransaction {
            conn,
            log: self.log,
        }))
    }
}

struct DieselTransaction {
    conn: OwnedConnection,
    log: QueryLog,
}

impl DieselTransaction {
    fn conn(&mut self) -> &mut AsyncPgConnection {
        &mut self.conn
    }
}

fn affected(rows: usize) -> u64 {
    u64::try_from(rows).unwrap_or(u64::MAX)
}

#[async_trait]
impl StoreTransaction for DieselTransaction {
    async fn insert_user(&mut self, user: &User) -> Result<UserId, StoreError> {
        let log = self.log;
        let id = log
            .run(
                "insert_user",
                diesel::insert_into(users::table)
                    .values(NewUserRow::from(user))
                    .returning(users::id)
                    .get_result::<i64>(self.conn()),
            )
            .await
            .map_err(|err| store_error(err, "insert_user"))?;
        Ok(UserId::new(id))
    }

    async fn find_users(&mut self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let mut query = users::table
            .select(UserRow::as_select())
            .order(users::id.asc())
            .into_boxed::<Pg>();
        if let Some(id) = filter.id {
            query = query.filter(users::id.eq(id.get()));
        }
        if let Some(name) = &filter.name {
            query = query.filter(lower(users::name).eq(name.to_lowercase()));
        }
        if let Some(email) = &filter.email {
            query = query.filter(lower_nullable(users::email).eq(email.to_lowercase()));
        }
        if let Some(api_key) = &filter.api_key {
            query = query.filter(users::api_key.eq(api_key.clone()));
        }
        let query = paginate!(query, filter.page);

        let log = self.log;
        let rows = log
            .run("find_users", query.load::<UserRow>(self.conn()))
            .await
            .map_err(|err| store_error(err, "find_users"))?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_user(&mut self, user: &User) -> Result<u64, StoreError> {
        let log = self.log;
        let rows = log
            .run(
                "update_user",
                diesel::update(users::table.filter(users::id.eq(user.id.get())))
                    .set(UserChangeset::from(user))
                    .execute(self.conn()),
            )
            .await
            .map_err(|err| store_error(err, "update_user"))?;
        Ok(affected(rows))
    }

    async fn delete_user(&mut self, id: UserId) -> Result<u64, StoreError> {
        let log = self.log;
        let rows = log
            .run(
                "delete_user",
                diesel::delete(users::table.filter(users::id.eq(id.get()))).execute(self.conn()),
            )
            .await
            .map_err(|err| store_error(err, "delete_user"))?;
        Ok(affected(rows))
    }

    async fn insert_list(&mut self, list: &List) -> Result<ListId, StoreError> {
        let log = self.log;
        let id = log
            .run(
                "insert_list",
                diesel::insert_into(lists::table)
                    .values(NewListRow::from(list))
                    .returning(lists::id)
                    .get_result::<i64>(self.conn()),
            )
            .await
            .map_err(|err| store_error(err, "insert_list"))?;
        Ok(ListId::new(id))
    }

    async fn find_lists(&mut self, filter: &ListFilter) -> Result<Vec<List>, StoreError> {
        let mut query = lists::table
            .select(ListRow::as_select())
            .order(lists::id.asc())
            .into_boxed::<Pg>();
        if let Some(id) = filter.id {
            query = query.filter(lists::id.eq(id.get()));
        }
        if let Some(owner) = filter.user_id {
            query = query.filter(lists::user_id.eq(owner.get()));
        }
        if let Some(name) = &filter.name {
            query = query.filter(lists::name.eq(name.clone()));
        }
        if let Some(completed) = filter.completed {
            query = query.filter(lists::completed.eq(completed));
        }
        let query = paginate!(query, filter.page);

        let log = self.log;
        let rows = log
            .run("find_lists", query.load::<ListRow>(self.conn()))
            .await
            .map_err(|err| store_error(err, "find_lists"))?;
        Ok(rows.into_iter().map(List::from).collect())
    }

    async fn update_list(&mut self, list: &List) -> Result<u64, StoreError> {
        let target = lists::table
            .filter(lists::id.eq(list.id.get()))
            .filter(lists::user_id.eq(list.user_id.get()));
        let log = self.log;
        let rows = log
            .run(
                "update_list",
                diesel::update(target)
                    .set(ListChangeset::from(list))
                    .execute(self.conn()),
            )
            .await
            .map_err(|err| store_error(err, "update_list"))?;
        Ok(affected(rows))
    }

    async fn delete_list(&mut self, id: ListId, owner: UserId) -> Result<u64, StoreError> {
        let target = lists::table
            .filter(lists::id.eq(id.get()))
            .filter(lists::user_id.eq(owner.get()));
        let log = self.log;
        let rows = log
            .run("delete_list", diesel::delete(target).execute(self.conn()))
            .await
            .map_err(|err| store_error(err, "delete_list"))?;
        Ok(affected(rows))
    }

    async fn insert_item(&mut self, item: &Item) -> Result<ItemId, StoreError> {
        let log = self.log;
        let id = log
            .run(
                "insert_item",
                diesel::insert_into(items::table)
                    .values(NewItemRow::from(item))
                    .returning(items::id)
                    .get_result::<i64>(self.conn()),
            )
            .await
            .map_err(|err| store_error(err, "insert_item"))?;
        Ok(ItemId::new(id))
    }

    async fn find_items(&mut self, filter: &ItemFilter) -> Result<Vec<Item>, StoreError> {
        let mut query = items::table
            .select(ItemRow::as_select())
            .order(items::id.asc())
            .into_boxed::<Pg>();
        if let Some(id) = filter.id {
            query = query.filter(items::id.eq(id.get()));
        }
        if let Some(owner) = filter.user_id {
            query = query.filter(items::user_id.eq(owner.get()));
        }
        if let Some(list_id) = filter.list_id {
            query = query.filter(items::list_id.eq(list_id.get()));
        }
        if let Some(name) = &filter.name {
            query = query.filter(items::name.eq(name.clone()));
        }
        if let Some(completed) = filter.completed {
            query = query.filter(items::completed.eq(completed));
        }
        let query = paginate!(query, filter.page);

        let log = self.log;
        let rows = log
            .run("find_items", query.load::<ItemRow>(self.conn()))
            .await
            .map_err(|err| store_error(err, "find_items"))?;
        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn update_item(&mut self, item: &Item) -> Result<u64, StoreError> {
        let target = items::table
            .filter(items::id.eq(item.id.get()))
            .filter(items::user_id.eq(item.user_id.get()));
        let log = self.log;
        let rows = log
            .run(
                "update_item",
                diesel::update(target)
                    .set(ItemChangeset::from(item))
                    .execute(self.conn()),
            )
            .await
            .map_err(|err| store_error(err, "update_item"))?;
        Ok(affected(rows))
    }

    async fn delete_item(&mut self, id: ItemId, owner: UserId) -> Result<u64, StoreError> {
        let target = items::table
            .filter(items::id.eq(id.get()))
            .filter(items::user_id.eq(owner.get()));
        let log = self.log;
        let rows = log
            .run("delete_item", diesel::delete(target).execute(self.conn()))
            .await
            .map_err(|err| store_error(err, "delete_item"))?;
        Ok(affected(rows))
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        let log = self.log;
        log.run(
            "commit",
            AnsiTransactionManager::commit_transaction(self.conn()),
        )
        .await
        .map_err(|err| store_error(err, "commit"))
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), StoreError> {
        let log = self.log;
        log.run(
            "rollback",
            AnsiTransactionManager::rollback_transaction(self.conn()),
        )
        .await
        .map_err(|err| store_error(err, "rollback"))
    }
}
