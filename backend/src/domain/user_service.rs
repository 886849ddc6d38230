//! User account use-cases.

use async_trait::async_trait;
use tracing::{info, warn};

use super::item_list_service::insert_list;
use super::ports::{StoreTransaction, UserService};
use super::store_context::{StoreContext, expect_rows, finish, store_failure};
use super::{
    ApiKey, Error, ErrorCode, LoginCredentials, NewList, NewUser, User, UserFilter, UserId,
    UserUpdate,
};
use chrono::{DateTime, Utc};

/// Name of the list every registered user starts with.
pub const DEFAULT_LIST_NAME: &str = "My first list";

/// [`UserService`] backed by the transactional store.
#[derive(Clone)]
pub struct StoreUserService {
    context: StoreContext,
}

impl StoreUserService {
    /// Create the service.
    pub fn new(context: StoreContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl UserService for StoreUserService {
    async fn create_user(&self, new_user: NewUser) -> Result<User, Error> {
        self.context
            .bounded("create_user", async {
                let mut tx = self.context.begin().await?;
                let outcome = insert_user(tx.as_mut(), new_user, self.context.now()).await;
                let user = finish(tx, outcome).await?;
                info!(user_id = %user.id, name = %user.name, "created user");
                Ok(user)
            })
            .await
    }

    async fn register_user(&self, new_user: NewUser) -> Result<User, Error> {
        self.context
            .bounded("register_user", async {
                let mut tx = self.context.begin().await?;
                let now = self.context.now();
                let outcome = async {
                    let user = insert_user(tx.as_mut(), new_user, now).await?;
                    let list =
                        insert_list(tx.as_mut(), &user, NewList::new(DEFAULT_LIST_NAME), now)
                            .await?;
                    Ok::<_, Error>((user, list))
                }
                .await;
                let (user, list) = finish(tx, outcome).await?;
                info!(
                    user_id = %user.id,
                    name = %user.name,
                    list_id = %list.id,
                    "registered user with default list"
                );
                Ok(user)
            })
            .await
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let found = self.find_user_by_name(credentials.name()).await;
        match found {
            Ok(user) if user.api_key.verify(credentials.api_key()) => Ok(user),
            Ok(user) => {
                warn!(user_id = %user.id, "login rejected: api key mismatch");
                Err(invalid_credentials())
            }
            Err(err) if err.is(ErrorCode::NotFound) => {
                warn!(name = %credentials.name(), "login rejected: unknown user");
                Err(invalid_credentials())
            }
            Err(err) => Err(err),
        }
    }

    async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User, Error> {
        update.validate()?;
        self.context
            .bounded("update_user", async {
                let mut tx = self.context.begin().await?;
                let outcome = async {
                    let mut user = find_one(tx.as_mut(), &UserFilter::by_id(id), || {
                        user_not_found_by_id(id)
                    })
                    .await?;
                    if let Some(name) = update.name.as_deref() {
                        ensure_name_available(tx.as_mut(), name, Some(id)).await?;
                    }
                    user.apply(&update);
                    user.updated_at = self.context.now();
                    user.validate()?;
                    let rows = tx.update_user(&user).await.map_err(store_failure)?;
                    expect_rows(rows, || user_not_found_by_id(id))?;
                    Ok::<_, Error>(user)
                }
                .await;
                finish(tx, outcome).await
            })
            .await
    }

    async fn delete_user(&self, id: UserId) -> Result<(), Error> {
        self.context
            .bounded("delete_user", async {
                let mut tx = self.context.begin().await?;
                let outcome = tx
                    .delete_user(id)
                    .await
                    .map_err(store_failure)
                    .and_then(|rows| {
                        expect_rows(rows, || {
                            Error::not_found(format!("could not delete user with id {id}"))
                        })
                    });
                finish(tx, outcome).await?;
                info!(user_id = %id, "deleted user");
                Ok(())
            })
            .await
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<User, Error> {
        self.find_single("find_user_by_id", UserFilter::by_id(id), || {
            user_not_found_by_id(id)
        })
        .await
    }

    async fn find_user_by_name(&self, name: &str) -> Result<User, Error> {
        self.find_single("find_user_by_name", UserFilter::by_name(name), || {
            Error::not_found(format!("could not find user with name {name:?}"))
        })
        .await
    }

    async fn find_user_by_api_key(&self, api_key: &str) -> Result<User, Error> {
        self.find_single("find_user_by_api_key", UserFilter::by_api_key(api_key), || {
            Error::not_found("could not find user with api key")
        })
        .await
    }

    async fn find_users(&self, filter: UserFilter) -> Result<Vec<User>, Error> {
        self.context
            .bounded("find_users", async {
                let mut tx = self.context.begin().await?;
                let outcome = tx.find_users(&filter).await.map_err(store_failure);
                finish(tx, outcome).await
            })
            .await
    }
}

impl StoreUserService {
    async fn find_single(
        &self,
        operation: &'static str,
        filter: UserFilter,
        missing: impl FnOnce() -> Error + Send,
    ) -> Result<User, Error> {
        self.context
            .bounded(operation, async {
                let mut tx = self.context.begin().await?;
                let outcome = find_one(tx.as_mut(), &filter, missing).await;
                finish(tx, outcome).await
            })
            .await
    }
}

async fn insert_user(
    tx: &mut dyn StoreTransaction,
    new_user: NewUser,
    now: DateTime<Utc>,
) -> Result<User, Error> {
    new_user.validate()?;
    ensure_name_available(tx, &new_user.name, None).await?;
    let mut user = User {
        id: UserId::default(),
        name: new_user.name,
        email: new_user.email,
        api_key: ApiKey::generate(),
        created_at: now,
        updated_at: now,
    };
    user.id = tx.insert_user(&user).await.map_err(store_failure)?;
    Ok(user)
}

async fn ensure_name_available(
    tx: &mut dyn StoreTransaction,
    name: &str,
    owner: Option<UserId>,
) -> Result<(), Error> {
    let taken = tx
        .find_users(&UserFilter::by_name(name))
        .await
        .map_err(store_failure)?
        .into_iter()
        .any(|user| Some(user.id) != owner);
    if taken {
        return Err(Error::with_code(
            "CONFLICT_NAME_TAKEN",
            format!("name {name:?} is taken"),
        ));
    }
    Ok(())
}

async fn find_one(
    tx: &mut dyn StoreTransaction,
    filter: &UserFilter,
    missing: impl FnOnce() -> Error,
) -> Result<User, Error> {
    tx.find_users(filter)
        .await
        .map_err(store_failure)?
        .into_iter()
        .next()
        .ok_or_else(missing)
}

fn user_not_found_by_id(id: UserId) -> Error {
    Error::not_found(format!("could not find user with id {id}"))
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

#[cfg(test)]
mod tests;
