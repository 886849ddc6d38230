//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed store, sessions and statistics using
//!   Diesel
//! - **memory**: process-local adapters used without a database
//! - **metrics**: Prometheus-backed metrics sink (feature-gated)
//!
//! Adapters are thin translators between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod memory;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
