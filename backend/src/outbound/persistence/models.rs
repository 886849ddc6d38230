//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and never
//! leave it. Conversions into domain types live next to the rows.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{items, lists, sessions, users};
use crate::domain::{ApiKey, Item, ItemId, List, ListId, User, UserId};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            name: row.name,
            email: row.email,
            api_key: ApiKey::from(row.api_key),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub api_key: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            name: &user.name,
            email: user.email.as_deref(),
            api_key: user.api_key.expose(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Changeset for profile updates. `email` is written even when `None` so a
/// cleared address is persisted.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserChangeset<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for UserChangeset<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            name: &user.name,
            email: user.email.as_deref(),
            updated_at: user.updated_at,
        }
    }
}

/// Row struct for reading from the lists table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = lists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ListRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ListRow> for List {
    fn from(row: ListRow) -> Self {
        Self {
            id: ListId::new(row.id),
            user_id: UserId::new(row.user_id),
            name: row.name,
            completed: row.completed,
            items: Vec::new(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable struct for creating lists.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = lists)]
pub(crate) struct NewListRow<'a> {
    pub user_id: i64,
    pub name: &'a str,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a List> for NewListRow<'a> {
    fn from(list: &'a List) -> Self {
        Self {
            user_id: list.user_id.get(),
            name: &list.name,
            completed: list.completed,
            created_at: list.created_at,
            updated_at: list.updated_at,
        }
    }
}

/// Changeset for list updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = lists)]
pub(crate) struct ListChangeset<'a> {
    pub name: &'a str,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a List> for ListChangeset<'a> {
    fn from(list: &'a List) -> Self {
        Self {
            name: &list.name,
            completed: list.completed,
            updated_at: list.updated_at,
        }
    }
}

/// Row struct for reading from the items table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ItemRow {
    pub id: i64,
    pub user_id: i64,
    pub list_id: i64,
    pub name: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: ItemId::new(row.id),
            user_id: UserId::new(row.user_id),
            list_id: ListId::new(row.list_id),
            name: row.name,
            completed: row.completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable struct for creating items.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = items)]
pub(crate) struct NewItemRow<'a> {
    pub user_id: i64,
    pub list_id: i64,
    pub name: &'a str,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Item> for NewItemRow<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            user_id: item.user_id.get(),
            list_id: item.list_id.get(),
            name: &item.name,
            completed: item.completed,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Changeset for item updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = items)]
pub(crate) struct ItemChangeset<'a> {
    pub name: &'a str,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Item> for ItemChangeset<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            name: &item.name,
            completed: item.completed,
            updated_at: item.updated_at,
        }
    }
}

/// Row struct for the sessions table, used for both reads and upserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = sessions)]
#[diesel(primary_key(token_hash))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SessionRow {
    pub token_hash: String,
    pub data: serde_json::Value,
    pub deadline: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
}
