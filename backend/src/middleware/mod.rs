//! Request middleware.
//!
//! Purpose: cross-cutting request lifecycle concerns: trace identifiers,
//! CORS headers and per-route request metrics.

pub mod cors;
pub mod request_metrics;
pub mod trace;

pub use cors::Cors;
pub use request_metrics::RequestMetrics;
pub use trace::Trace;
