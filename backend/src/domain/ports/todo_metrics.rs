//! Metrics sink injected into the components that report measurements.
//!
//! Implementations may export to Prometheus or discard everything; the
//! domain never touches process-wide metric registries directly.

use std::time::Duration;

use async_trait::async_trait;

use super::define_port_error;
use super::store_stats::StoreCounts;

define_port_error! {
    /// Errors exposed when recording metrics.
    pub enum TodoMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } => "todo metrics exporter failed: {message}",
    }
}

/// Metrics recording port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoMetrics: Send + Sync {
    /// Record one handled request against its route pattern.
    async fn record_request(
        &self,
        method: &str,
        route: &str,
        elapsed: Duration,
    ) -> Result<(), TodoMetricsError>;

    /// Publish the latest row counts.
    async fn record_store_counts(&self, counts: StoreCounts) -> Result<(), TodoMetricsError>;
}

/// No-op implementation for when metrics are disabled or in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpTodoMetrics;

#[async_trait]
impl TodoMetrics for NoOpTodoMetrics {
    async fn record_request(
        &self,
        _method: &str,
        _route: &str,
        _elapsed: Duration,
    ) -> Result<(), TodoMetricsError> {
        Ok(())
    }

    async fn record_store_counts(&self, _counts: StoreCounts) -> Result<(), TodoMetricsError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_op_metrics_accept_everything() {
        let metrics = NoOpTodoMetrics;
        assert!(
            metrics
                .record_request("GET", "/api/todos", Duration::from_millis(3))
                .await
                .is_ok()
        );
        assert!(
            metrics
                .record_store_counts(StoreCounts::default())
                .await
                .is_ok()
        );
    }
}
