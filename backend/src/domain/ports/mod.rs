//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod item_list_service;
mod session_store;
mod store_stats;
mod todo_metrics;
mod todo_store;
mod user_service;

pub use item_list_service::ItemListService;
#[cfg(test)]
pub use session_store::MockSessionStore;
pub use session_store::{SessionRecord, SessionStore, SessionStoreError};
#[cfg(test)]
pub use store_stats::MockStoreStats;
pub use store_stats::{StoreCounts, StoreStats, StoreStatsError};
#[cfg(test)]
pub use todo_metrics::MockTodoMetrics;
pub use todo_metrics::{NoOpTodoMetrics, TodoMetrics, TodoMetricsError};
#[cfg(test)]
pub use todo_store::MockTodoStore;
pub use todo_store::{StoreError, StoreTransaction, TodoStore};
pub use user_service::UserService;
