//! Server-side session lifecycle.
//!
//! A session is an opaque random token handed to the client and a
//! [`SessionRecord`] stored under the SHA-256 digest of that token. The record
//! carries a snapshot of the logged-in user, an absolute deadline and a
//! sliding idle expiry. Expired records are treated as absent.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use rand::RngCore;
use serde_json::Map;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use super::ports::{SessionRecord, SessionStore, SessionStoreError};
use super::{Error, User};

const USER_KEY: &str = "user";
const TOKEN_BYTES: usize = 32;

/// Absolute and idle limits applied to every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Maximum session age regardless of activity.
    pub lifetime: TimeDelta,
    /// Maximum time between two requests.
    pub idle_timeout: TimeDelta,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            lifetime: TimeDelta::hours(24),
            idle_timeout: TimeDelta::minutes(20),
        }
    }
}

/// Opaque token identifying a session.
///
/// # Examples
/// ```
/// use todo_backend::domain::SessionToken;
///
/// let token = SessionToken::generate();
/// assert_eq!(token.as_str().len(), 64);
/// assert_ne!(token.digest(), token.as_str());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Draw a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Token as sent to the client.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Key under which the record is stored.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Creates, resolves, renews and destroys sessions.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    policy: SessionPolicy,
}

impl SessionService {
    /// Create a service with the default policy.
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            policy: SessionPolicy::default(),
        }
    }

    /// Replace the session policy.
    #[must_use]
    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Start a session bound to `user`.
    pub async fn create(&self, user: &User) -> Result<SessionToken, Error> {
        let now = self.clock.utc();
        let deadline = now + self.policy.lifetime;
        self.issue(user, deadline, now).await
    }

    /// Resolve a token to the user snapshot it carries.
    ///
    /// Unknown, expired and undecodable sessions resolve to `None`. A live
    /// session has its idle expiry pushed forward, never past the deadline.
    pub async fn load(&self, token: &SessionToken) -> Result<Option<User>, Error> {
        let key = token.digest();
        let Some(mut record) = self.store.find(&key).await.map_err(session_failure)? else {
            return Ok(None);
        };
        let now = self.clock.utc();
        if record.is_expired(now) {
            debug!("discarding expired session");
            self.store.delete(&key).await.map_err(session_failure)?;
            return Ok(None);
        }
        let user = match record.values.get(USER_KEY).cloned() {
            Some(value) => match serde_json::from_value::<User>(value) {
                Ok(user) => user,
                Err(err) => {
                    warn!(error = %err, "discarding session with undecodable user");
                    self.store.delete(&key).await.map_err(session_failure)?;
                    return Ok(None);
                }
            },
            None => return Ok(None),
        };
        let expiry = self.idle_expiry(now, record.deadline);
        if expiry != record.expiry {
            record.expiry = expiry;
            self.store.save(&key, &record).await.map_err(session_failure)?;
        }
        Ok(Some(user))
    }

    /// Replace `previous` with a new token carrying the updated snapshot.
    ///
    /// The original deadline is kept when the previous session is still
    /// stored.
    pub async fn renew(
        &self,
        previous: Option<&SessionToken>,
        user: &User,
    ) -> Result<SessionToken, Error> {
        let now = self.clock.utc();
        let mut deadline = now + self.policy.lifetime;
        if let Some(previous) = previous {
            let key = previous.digest();
            if let Some(record) = self.store.find(&key).await.map_err(session_failure)? {
                if !record.is_expired(now) {
                    deadline = record.deadline;
                }
            }
            self.store.delete(&key).await.map_err(session_failure)?;
        }
        self.issue(user, deadline, now).await
    }

    /// End a session.
    pub async fn destroy(&self, token: &SessionToken) -> Result<(), Error> {
        self.store
            .delete(&token.digest())
            .await
            .map_err(session_failure)
    }

    /// Delete every expired record.
    pub async fn sweep_expired(&self) -> Result<u64, Error> {
        let removed = self
            .store
            .delete_expired(self.clock.utc())
            .await
            .map_err(session_failure)?;
        if removed > 0 {
            info!(removed, "swept expired sessions");
        }
        Ok(removed)
    }

    /// Sweep on a fixed period until `shutdown` flips to `true`.
    pub async fn run_sweeper(
        self,
        period: Duration,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.sweep_expired().await {
                        debug!(code = err.code(), "session sweep failed; retrying next tick");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("session sweeper stopping");
                        return;
                    }
                }
            }
        }
    }

    async fn issue(
        &self,
        user: &User,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<SessionToken, Error> {
        let snapshot = serde_json::to_value(user)
            .map_err(|err| session_failure(SessionStoreError::codec(err.to_string())))?;
        let mut values = Map::new();
        values.insert(USER_KEY.to_owned(), snapshot);
        let record = SessionRecord {
            values,
            deadline,
            expiry: self.idle_expiry(now, deadline),
        };
        let token = SessionToken::generate();
        self.store
            .save(&token.digest(), &record)
            .await
            .map_err(session_failure)?;
        Ok(token)
    }

    fn idle_expiry(&self, now: DateTime<Utc>, deadline: DateTime<Utc>) -> DateTime<Utc> {
        (now + self.policy.idle_timeout).min(deadline)
    }
}

fn session_failure(err: SessionStoreError) -> Error {
    error!(error = %err, "session store operation failed");
    Error::internal("session store operation failed")
}
