//! PostgreSQL persistence adapters using Diesel.
//!
//! Concrete implementations of the store, session and statistics ports
//! backed by PostgreSQL via `diesel-async` and `bb8` connection pooling.
//!
//! - Adapters only translate between Diesel rows and domain types; no
//!   business rules live here.
//! - Row structs (`models.rs`) and table definitions (`schema.rs`) never
//!   leave this module.
//! - Every Diesel failure is mapped to the port's own error type.
//!
//! # Example
//!
//! ```no_run
//! use todo_backend::outbound::persistence::{DbPool, DieselTodoStore, PoolConfig};
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/todo")).await?;
//! let store = DieselTodoStore::new(pool);
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

mod diesel_session_store;
mod diesel_store_stats;
mod diesel_todo_store;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod query_log;
mod schema;

pub use diesel_session_store::DieselSessionStore;
pub use diesel_store_stats::DieselStoreStats;
pub use diesel_todo_store::DieselTodoStore;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbPool, OwnedConnection, PoolConfig, PoolError};
pub use query_log::QueryLog;
