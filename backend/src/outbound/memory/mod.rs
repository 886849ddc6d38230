//! In-memory adapters for the store, session and statistics ports.
//!
//! Used when no database DSN is configured and by tests that exercise the
//! full request path without PostgreSQL. State lives for the lifetime of the
//! process.

mod session_store;
mod store_stats;
mod todo_store;

pub use session_store::MemorySessionStore;
pub use store_stats::MemoryStoreStats;
pub use todo_store::MemoryTodoStore;

/// Widen a collection length into a row count.
fn row_count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}
