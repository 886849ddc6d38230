//! Shared plumbing for services that run their work inside store
//! transactions.
//!
//! Every persisted timestamp comes from the injected clock, normalised to UTC
//! at microsecond precision. Each transaction ends in [`finish`]: committed
//! when the work succeeded, rolled back when it failed. Store work is bounded
//! by a deadline; when it elapses the in-flight future is dropped along with
//! its open transaction.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use tracing::{error, warn};

use super::Error;
use super::ports::{StoreError, StoreTransaction, TodoStore};

/// Default deadline applied to each domain operation.
pub const DEFAULT_STORE_DEADLINE: Duration = Duration::from_secs(6);

/// Store handle, clock and deadline shared by the domain services.
#[derive(Clone)]
pub struct StoreContext {
    store: Arc<dyn TodoStore>,
    clock: Arc<dyn Clock>,
    deadline: Duration,
}

impl StoreContext {
    /// Bundle a store and clock with the default deadline.
    pub fn new(store: Arc<dyn TodoStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            deadline: DEFAULT_STORE_DEADLINE,
        }
    }

    /// Replace the per-operation deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Current time as it should be persisted.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc().round_subsecs(6)
    }

    /// Open a transaction.
    pub async fn begin(&self) -> Result<Box<dyn StoreTransaction>, Error> {
        self.store.begin().await.map_err(store_failure)
    }

    /// Run `work` under the configured deadline.
    pub async fn bounded<T, F>(&self, operation: &'static str, work: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        match tokio::time::timeout(self.deadline, work).await {
            Ok(outcome) => outcome,
            Err(_) => {
                error!(
                    operation,
                    deadline_ms = u64::try_from(self.deadline.as_millis()).unwrap_or(u64::MAX),
                    "store operation exceeded its deadline"
                );
                Err(Error::internal(format!("{operation} timed out")))
            }
        }
    }
}

/// Commit `tx`, translating adapter failures.
pub async fn commit(tx: Box<dyn StoreTransaction>) -> Result<(), Error> {
    tx.commit().await.map_err(store_failure)
}

/// End `tx` according to `outcome`.
///
/// A successful outcome is committed and a failed one rolled back. The
/// original error wins over a rollback failure, which is only logged.
pub async fn finish<T>(
    tx: Box<dyn StoreTransaction>,
    outcome: Result<T, Error>,
) -> Result<T, Error> {
    match outcome {
        Ok(value) => {
            commit(tx).await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, code = err.code(), "rollback failed");
            }
            Err(err)
        }
    }
}

/// Translate an adapter failure into a taxonomy error.
///
/// Uniqueness violations surface as conflicts; everything else is internal
/// and its detail only reaches the logs.
pub fn store_failure(err: StoreError) -> Error {
    match err {
        StoreError::UniqueViolation { message } => {
            warn!(%message, "store rejected duplicate row");
            Error::conflict("resource already exists")
        }
        other => {
            error!(error = %other, "store operation failed");
            Error::internal("store operation failed")
        }
    }
}

/// Convert an affected-row count into a not-found error when nothing
/// matched.
pub fn expect_rows(rows: u64, missing: impl FnOnce() -> Error) -> Result<(), Error> {
    if rows == 0 { Err(missing()) } else { Ok(()) }
}
