//! Port for sampling row counts from the store.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised while sampling store statistics.
    pub enum StoreStatsError {
        /// Counting query failed.
        Query { message: String } => "store statistics query failed: {message}",
    }
}

/// Row counts sampled at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    /// Registered users.
    pub users: u64,
    /// Todo lists.
    pub lists: u64,
    /// Todo items.
    pub items: u64,
    /// Live session records.
    pub sessions: u64,
}

/// Source of [`StoreCounts`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreStats: Send + Sync {
    /// Count rows in every table.
    async fn counts(&self) -> Result<StoreCounts, StoreStatsError>;
}
