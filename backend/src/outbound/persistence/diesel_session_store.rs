//! PostgreSQL-backed [`SessionStore`].
//!
//! Session values are stored as a JSONB object; the deadline and idle expiry
//! are real columns so expired rows can be swept with an indexed delete.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::Value;

use super::error_mapping::{session_error, session_pool_error};
use super::models::SessionRow;
use super::pool::DbPool;
use super::query_log::QueryLog;
use super::schema::sessions;
use crate::domain::ports::{SessionRecord, SessionStore, SessionStoreError};

/// Diesel-backed session storage.
#[derive(Clone)]
pub struct DieselSessionStore {
    pool: DbPool,
    log: QueryLog,
}

impl DieselSessionStore {
    /// Create a store drawing connections from `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            log: QueryLog::default(),
        }
    }

    /// Log every session query with its elapsed time.
    #[must_use]
    pub fn with_query_log(mut self, log: QueryLog) -> Self {
        self.log = log;
        self
    }
}

fn record_from_row(row: SessionRow) -> Result<SessionRecord, SessionStoreError> {
    match row.data {
        Value::Object(values) => Ok(SessionRecord {
            values,
            deadline: row.deadline,
            expiry: row.expiry,
        }),
        other => Err(SessionStoreError::codec(format!(
            "expected an object of session values, found {other}"
        ))),
    }
}

fn row_from_record(token_hash: &str, record: &SessionRecord) -> SessionRow {
    SessionRow {
        token_hash: token_hash.to_owned(),
        data: Value::Object(record.values.clone()),
        deadline: record.deadline,
        expiry: record.expiry,
    }
}

#[async_trait]
impl SessionStore for DieselSessionStore {
    async fn find(&self, token_hash: &str) -> Result<Option<SessionRecord>, SessionStoreError> {
        let mut conn = self.pool.get().await.map_err(session_pool_error)?;
        let row = self
            .log
            .run(
                "find_session",
                sessions::table
                    .find(token_hash)
                    .select(SessionRow::as_select())
                    .first::<SessionRow>(&mut conn),
            )
            .await
            .optional()
            .map_err(|err| session_error(err, "find_session"))?;
        row.map(record_from_row).transpose()
    }

    async fn save(
        &self,
        token_hash: &str,
        record: &SessionRecord,
    ) -> Result<(), SessionStoreError> {
        let row = row_from_record(token_hash, record);
        let mut conn = self.pool.get().await.map_err(session_pool_error)?;
        self.log
            .run(
                "save_session",
                diesel::insert_into(sessions::table)
                    .values(&row)
                    .on_conflict(sessions::token_hash)
                    .do_update()
                    .set(&row)
                    .execute(&mut conn),
            )
            .await
            .map_err(|err| session_error(err, "save_session"))?;
        Ok(())
    }

    async fn delete(&self, token_hash: &str) -> Result<(), SessionStoreError> {
        let mut conn = self.pool.get().await.map_err(session_pool_error)?;
        self.log
            .run(
                "delete_session",
                diesel::delete(sessions::table.find(token_hash)).execute(&mut conn),
            )
            .await
            .map_err(|err| session_error(err, "delete_session"))?;
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError> {
        let mut conn = self.pool.get().await.map_err(session_pool_error)?;
        let removed = self
            .log
            .run(
                "delete_expired_sessions",
                diesel::delete(sessions::table.filter(sessions::expiry.le(now)))
                    .execute(&mut conn),
            )
            .await
            .map_err(|err| session_error(err, "delete_expired_sessions"))?;
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}
