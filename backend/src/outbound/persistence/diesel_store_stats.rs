//! PostgreSQL-backed [`StoreStats`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::error_mapping::{stats_error, stats_pool_error};
use super::pool::DbPool;
use super::schema::{items, lists, sessions, users};
use crate::domain::ports::{StoreCounts, StoreStats, StoreStatsError};

/// Counts rows with one `COUNT(*)` per table.
#[derive(Clone)]
pub struct DieselStoreStats {
    pool: DbPool,
}

impl DieselStoreStats {
    /// Sample tables through `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn count(rows: i64) -> u64 {
    u64::try_from(rows).unwrap_or_default()
}

#[async_trait]
impl StoreStats for DieselStoreStats {
    async fn counts(&self) -> Result<StoreCounts, StoreStatsError> {
        let mut conn = self.pool.get().await.map_err(stats_pool_error)?;
        let users = users::table
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(|err| stats_error(err, "count_users"))?;
        let lists = lists::table
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(|err| stats_error(err, "count_lists"))?;
        let items = items::table
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(|err| stats_error(err, "count_items"))?;
        let sessions = sessions::table
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(|err| stats_error(err, "count_sessions"))?;

        Ok(StoreCounts {
            users: count(users),
            lists: count(lists),
            items: count(items),
            sessions: count(sessions),
        })
    }
}
