//! User accounts and their API keys.
//!
//! A [`User`] is identified by a store-assigned [`UserId`] and a name that is
//! unique without regard to case. Each user owns an [`ApiKey`] which doubles
//! as the bearer token and the login secret; it is never serialised with the
//! user.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::{Error, Page, UserId};

/// Number of characters in a generated API key.
pub const API_KEY_LEN: usize = 16;

const API_KEY_ALPHABET: &[u8] =
    b"`0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Opaque per-user secret.
///
/// Debug output is redacted and the backing buffer is zeroed on drop.
///
/// # Examples
/// ```
/// use todo_backend::domain::{ApiKey, API_KEY_LEN};
///
/// let key = ApiKey::generate();
/// assert_eq!(key.expose().len(), API_KEY_LEN);
/// assert!(key.verify(key.expose()));
/// assert!(!key.verify("guess"));
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey(Zeroizing<String>);

impl ApiKey {
    /// Draw a fresh random key.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let key: String = (0..API_KEY_LEN)
            .map(|_| char::from(API_KEY_ALPHABET[rng.gen_range(0..API_KEY_ALPHABET.len())]))
            .collect();
        Self(Zeroizing::new(key))
    }

    /// Raw key material.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// True when no key has been assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compare `candidate` with this key.
    ///
    /// Both sides are hashed first so the comparison time does not depend on
    /// how many leading characters match.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        !self.is_empty() && digests_match(self.expose(), candidate)
    }
}

/// Compare two secrets through their SHA-256 digests.
pub(crate) fn digests_match(left: &str, right: &str) -> bool {
    let left = Sha256::digest(left.as_bytes());
    let right = Sha256::digest(right.as_bytes());
    left.iter()
        .zip(right.iter())
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

impl From<String> for ApiKey {
    fn from(value: String) -> Self {
        Self(Zeroizing::new(value))
    }
}

impl From<&str> for ApiKey {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Application user.
///
/// ## Invariants
/// - `id` is positive once persisted.
/// - `name` is non-empty and unique ignoring case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,
    /// Login name.
    #[schema(example = "alice")]
    pub name: String,
    /// Contact address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "alice@example.com")]
    pub email: Option<String>,
    /// Bearer token and login secret. Never serialised.
    #[serde(skip)]
    pub api_key: ApiKey,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check the fields every persisted user must carry.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.id.is_assigned() {
            return Err(Error::with_code("INVALID_ID_REQUIRED", "id required"));
        }
        if self.name.is_empty() {
            return Err(Error::with_code("INVALID_NAME_REQUIRED", "name required"));
        }
        Ok(())
    }

    /// Apply the fields present in `update`.
    pub fn apply(&mut self, update: &UserUpdate) {
        if let Some(name) = &update.name {
            self.name.clone_from(name);
        }
        if let Some(email) = &update.email {
            self.email = Some(email.clone());
        }
    }
}

/// Payload for registering a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Requested login name.
    #[serde(default)]
    #[schema(example = "alice")]
    pub name: String,
    /// Optional contact address.
    #[serde(default)]
    pub email: Option<String>,
}

impl NewUser {
    /// Build a registration payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
        }
    }

    /// Attach an email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// The name must be present before anything touches the store.
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.is_empty() {
            return Err(Error::with_code("INVALID_NAME_REQUIRED", "name required"));
        }
        Ok(())
    }
}

/// Partial update of a user. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    /// Replacement name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserUpdate {
    /// At least one field must be present and a present name must not be
    /// empty.
    pub fn validate(&self) -> Result<(), Error> {
        match (&self.name, &self.email) {
            (None, None) => Err(Error::with_code(
                "INVALID_UPDATE_EMPTY",
                "one of name or email is required",
            )),
            (Some(name), _) if name.is_empty() => {
                Err(Error::with_code("INVALID_NAME_EMPTY", "name cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

/// Conjunctive user query. Name and email compare without regard to case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Exact identifier.
    pub id: Option<UserId>,
    /// Name, compared case-insensitively.
    pub name: Option<String>,
    /// Email, compared case-insensitively.
    pub email: Option<String>,
    /// Exact API key.
    pub api_key: Option<String>,
    /// Result window.
    pub page: Page,
}

impl UserFilter {
    /// Match a single identifier.
    pub fn by_id(id: UserId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Match a name, ignoring case.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Match an API key exactly.
    pub fn by_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
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
    pub fn matches(&self, user: &User) -> bool {
        self.id.is_none_or(|id| user.id == id)
            && self
                .name
                .as_deref()
                .is_none_or(|name| user.name.to_lowercase() == name.to_lowercase())
            && self.email.as_deref().is_none_or(|email| {
                user.email
                    .as_deref()
                    .is_some_and(|own| own.to_lowercase() == email.to_lowercase())
            })
            && self
                .api_key
                .as_deref()
                .is_none_or(|key| user.api_key.expose() == key)
    }
}
