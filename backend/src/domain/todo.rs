//! Todo lists and the items they contain.
//!
//! Lists belong to exactly one user. Items inherit their owner from the list
//! they are created in; the owner is never taken from caller input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Error, ItemId, ListId, Page, UserId};

/// A single entry in a [`List`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Store-assigned identifier.
    pub id: ItemId,
    /// Owner, copied from the parent list.
    pub user_id: UserId,
    /// Parent list.
    pub list_id: ListId,
    /// Item text.
    #[schema(example = "Milk")]
    pub name: String,
    /// Completion flag.
    pub completed: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Check the fields every stored item must carry.
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.is_empty() {
            return Err(Error::with_code("INVALID_NAME_REQUIRED", "name required"));
        }
        if !self.user_id.is_assigned() {
            return Err(Error::with_code(
                "INVALID_USER_ID_REQUIRED",
                "user id required",
            ));
        }
        if !self.list_id.is_assigned() {
            return Err(Error::with_code(
                "INVALID_LIST_ID_REQUIRED",
                "list id required",
            ));
        }
        Ok(())
    }

    /// Apply the fields present in `update`.
    pub fn apply(&mut self, update: &ItemUpdate) {
        if let Some(name) = &update.name {
            self.name.clone_from(name);
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
    }
}

/// A named collection of [`Item`]s owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct List {
    /// Store-assigned identifier.
    pub id: ListId,
    /// Owner. Fixed at creation.
    pub user_id: UserId,
    /// List title.
    #[schema(example = "Groceries")]
    pub name: String,
    /// Completion flag, set explicitly by the owner.
    pub completed: bool,
    /// Items ordered by id ascending.
    #[serde(default)]
    pub items: Vec<Item>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl List {
    /// Check the fields every stored list must carry.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.user_id.is_assigned() {
            return Err(Error::with_code(
                "INVALID_USER_ID_REQUIRED",
                "user id required",
            ));
        }
        if self.name.is_empty() {
            return Err(Error::with_code("INVALID_NAME_REQUIRED", "name required"));
        }
        Ok(())
    }

    /// Apply the fields present in `update`.
    pub fn apply(&mut self, update: &ListUpdate) {
        if let Some(name) = &update.name {
            self.name.clone_from(name);
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
    }
}

/// Payload for creating a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewList {
    /// List title.
    #[serde(default)]
    #[schema(example = "Groceries")]
    pub name: String,
    /// Initial completion flag.
    #[serde(default)]
    pub completed: bool,
}

impl NewList {
    /// Build a payload with the given title.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            completed: false,
        }
    }
}

/// Payload for creating an item. The owner comes from the parent list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    /// Item text.
    #[serde(default)]
    #[schema(example = "Milk")]
    pub name: String,
    /// Initial completion flag.
    #[serde(default)]
    pub completed: bool,
}

impl NewItem {
    /// Build a payload with the given text.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            completed: false,
        }
    }
}

/// Partial update of a list. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListUpdate {
    /// Replacement title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement completion flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Partial update of an item. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    /// Replacement text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement completion flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Conjunctive list query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Exact identifier.
    pub id: Option<ListId>,
    /// Owner.
    pub user_id: Option<UserId>,
    /// Exact title.
    pub name: Option<String>,
    /// Completion flag.
    pub completed: Option<bool>,
    /// Result window.
    pub page: Page,
}

impl ListFilter {
    /// Match a single list.
    pub fn by_id(id: ListId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Match every list owned by `user_id`.
    pub fn by_owner(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    /// Restrict the result window.
    #[must_use]
    pub fn with_page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    /// Evaluate the filter against an in-memory row.
    pub fn matches(&self, list: &List) -> bool {
        self.id.is_none_or(|id| list.id == id)
            && self.user_id.is_none_or(|user_id| list.user_id == user_id)
            && self.name.as_deref().is_none_or(|name| list.name == name)
            && self.completed.is_none_or(|flag| list.completed == flag)
    }
}

/// Conjunctive item query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Exact identifier.
    pub id: Option<ItemId>,
    /// Owner.
    pub user_id: Option<UserId>,
    /// Parent list.
    pub list_id: Option<ListId>,
    /// Exact text.
    pub name: Option<String>,
    /// Completion flag.
    pub completed: Option<bool>,
    /// Result window.
    pub page: Page,
}

impl ItemFilter {
    /// Match a single item.
    pub fn by_id(id: ItemId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Match every item in `list_id`.
    pub fn by_list(list_id: ListId) -> Self {
        Self {
            list_id: Some(list_id),
            ..Self::default()
        }
    }

    /// Evaluate the filter against an in-memory row.
    pub fn matches(&self, item: &Item) -> bool {
        self.id.is_none_or(|id| item.id == id)
            && self.user_id.is_none_or(|user_id| item.user_id == user_id)
            && self.list_id.is_none_or(|list_id| item.list_id == list_id)
            && self.name.as_deref().is_none_or(|name| item.name == name)
            && self.completed.is_none_or(|flag| item.completed == flag)
    }
}
