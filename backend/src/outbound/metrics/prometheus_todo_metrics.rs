//! Prometheus adapter for request and store metrics.
//!
//! Metrics are registered with the registry served by the `/metrics`
//! endpoint.
//!
//! # Metrics
//!
//! - `todo_http_route_request_count` (counter; `method`, `route`): handled
//!   requests.
//! - `todo_http_route_request_time` (counter; `method`, `route`): total
//!   seconds spent handling requests.
//! - `todo_db_users`, `todo_db_todo_lists`, `todo_db_todo_items`,
//!   `todo_db_sessions` (gauges): latest sampled row counts.

use std::time::Duration;

use async_trait::async_trait;
use prometheus::{CounterVec, IntGauge, Opts, Registry};

use crate::domain::ports::{StoreCounts, TodoMetrics, TodoMetricsError};

/// Prometheus-backed metrics sink.
pub struct PrometheusTodoMetrics {
    request_count: CounterVec,
    request_time: CounterVec,
    users: IntGauge,
    lists: IntGauge,
    items: IntGauge,
    sessions: IntGauge,
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<IntGauge, prometheus::Error> {
    let gauge = IntGauge::new(name, help)?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

fn saturating(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

impl PrometheusTodoMetrics {
    /// Create and register metrics with the given registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let request_count = CounterVec::new(
            Opts::new("todo_http_route_request_count", "Handled requests by route"),
            &["method", "route"],
        )?;
        registry.register(Box::new(request_count.clone()))?;
        let request_time = CounterVec::new(
            Opts::new(
                "todo_http_route_request_time",
                "Seconds spent handling requests by route",
            ),
            &["method", "route"],
        )?;
        registry.register(Box::new(request_time.clone()))?;

        Ok(Self {
            request_count,
            request_time,
            users: gauge(registry, "todo_db_users", "Registered users")?,
            lists: gauge(registry, "todo_db_todo_lists", "Stored todo lists")?,
            items: gauge(registry, "todo_db_todo_items", "Stored todo items")?,
            sessions: gauge(registry, "todo_db_sessions", "Stored session records")?,
        })
    }
}

#[async_trait]
impl TodoMetrics for PrometheusTodoMetrics {
    async fn record_request(
        &self,
        method: &str,
        route: &str,
        elapsed: Duration,
    ) -> Result<(), TodoMetricsError> {
        self.request_count.with_label_values(&[method, route]).inc();
        self.request_time
            .with_label_values(&[method, route])
            .inc_by(elapsed.as_secs_f64());
        Ok(())
    }

    async fn record_store_counts(&self, counts: StoreCounts) -> Result<(), TodoMetricsError> {
        self.users.set(saturating(counts.users));
        self.lists.set(saturating(counts.lists));
        self.items.set(saturating(counts.items));
        self.sessions.set(saturating(counts.sessions));
        Ok(())
    }
}
