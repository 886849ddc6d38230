//! Driving port for user account use-cases.
//!
//! Inbound adapters call this port; the concrete service runs every
//! operation inside one store transaction.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, NewUser, User, UserFilter, UserId, UserUpdate};

/// User account operations.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a user with a fresh API key.
    async fn create_user(&self, new_user: NewUser) -> Result<User, Error>;

    /// Create a user together with their default list, atomically.
    async fn register_user(&self, new_user: NewUser) -> Result<User, Error>;

    /// Resolve a user from their name and API key.
    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    /// Apply a partial update and return the stored result.
    async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User, Error>;

    /// Remove a user together with everything they own.
    async fn delete_user(&self, id: UserId) -> Result<(), Error>;

    /// Look a user up by id.
    async fn find_user_by_id(&self, id: UserId) -> Result<User, Error>;

    /// Look a user up by name, ignoring case.
    async fn find_user_by_name(&self, name: &str) -> Result<User, Error>;

    /// Look a user up by API key.
    async fn find_user_by_api_key(&self, api_key: &str) -> Result<User, Error>;

    /// Users matching `filter`, ordered by id ascending.
    async fn find_users(&self, filter: UserFilter) -> Result<Vec<User>, Error>;
}
