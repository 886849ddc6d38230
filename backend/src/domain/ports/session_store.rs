//! Port for server-side session records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session store adapters.
    pub enum SessionStoreError {
        /// The backing store could not be reached.
        Connection { message: String } => "session store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "session store query failed: {message}",
        /// A stored record could not be encoded or decoded.
        Codec { message: String } => "session record codec failed: {message}",
    }
}

/// Persisted session state.
///
/// `deadline` is the absolute end of the session; `expiry` is the idle
/// cut-off and never exceeds `deadline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Arbitrary session values keyed by name.
    pub values: Map<String, Value>,
    /// Absolute end of the session.
    pub deadline: DateTime<Utc>,
    /// Idle expiry.
    pub expiry: DateTime<Utc>,
}

impl SessionRecord {
    /// True once either the idle expiry or the deadline has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry || now >= self.deadline
    }
}

/// Storage for session records keyed by the digest of their token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a record, expired or not.
    async fn find(&self, token_hash: &str) -> Result<Option<SessionRecord>, SessionStoreError>;

    /// Insert or replace a record.
    async fn save(&self, token_hash: &str, record: &SessionRecord)
    -> Result<(), SessionStoreError>;

    /// Remove a record. Removing an absent record is not an error.
    async fn delete(&self, token_hash: &str) -> Result<(), SessionStoreError>;

    /// Remove every record whose expiry is at or before `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError>;
}
