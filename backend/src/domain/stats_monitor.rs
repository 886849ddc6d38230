//! Periodic sampling of store row counts into the metrics sink.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use super::ports::{StoreStats, TodoMetrics};

/// Sampling period used by the server.
pub const STATS_SAMPLE_PERIOD: Duration = Duration::from_secs(10);

/// Forwards [`StoreStats`] samples to a [`TodoMetrics`] sink.
#[derive(Clone)]
pub struct StoreStatsMonitor {
    stats: Arc<dyn StoreStats>,
    metrics: Arc<dyn TodoMetrics>,
}

impl StoreStatsMonitor {
    /// Create a monitor.
    pub fn new(stats: Arc<dyn StoreStats>, metrics: Arc<dyn TodoMetrics>) -> Self {
        Self { stats, metrics }
    }

    /// Take one sample. Failures are logged and swallowed.
    pub async fn sample(&self) {
        let counts = match self.stats.counts().await {
            Ok(counts) => counts,
            Err(err) => {
                warn!(error = %err, "failed to sample store statistics");
                return;
            }
        };
        if let Err(err) = self.metrics.record_store_counts(counts).await {
            warn!(error = %err, "failed to publish store statistics");
        }
    }

    /// Sample every `period` until `shutdown` flips to `true`.
    pub async fn run(self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.sample().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("store statistics monitor stopping");
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockStoreStats, MockTodoMetrics, StoreCounts, StoreStatsError,
    };
    use mockall::predicate::eq;

    #[tokio::test]
    async fn samples_are_forwarded() {
        let counts = StoreCounts {
            users: 2,
            lists: 3,
            items: 5,
            sessions: 1,
        };
        let mut stats = MockStoreStats::new();
        stats.expect_counts().times(1).returning(move || Ok(counts));
        let mut metrics = MockTodoMetrics::new();
        metrics
            .expect_record_store_counts()
            .with(eq(counts))
            .times(1)
            .returning(|_| Ok(()));
        StoreStatsMonitor::new(Arc::new(stats), Arc::new(metrics))
            .sample()
            .await;
    }

    #[tokio::test]
    async fn failed_samples_are_not_published() {
        let mut stats = MockStoreStats::new();
        stats
            .expect_counts()
            .returning(|| Err(StoreStatsError::query("timeout")));
        let mut metrics = MockTodoMetrics::new();
        metrics.expect_record_store_counts().never();
        StoreStatsMonitor::new(Arc::new(stats), Arc::new(metrics))
            .sample()
            .await;
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let mut stats = MockStoreStats::new();
        stats
            .expect_counts()
            .returning(|| Ok(StoreCounts::default()));
        let mut metrics = MockTodoMetrics::new();
        metrics
            .expect_record_store_counts()
            .returning(|_| Ok(()));
        let (tx, rx) = watch::channel(false);
        let monitor = StoreStatsMonitor::new(Arc::new(stats), Arc::new(metrics));
        let handle = tokio::spawn(monitor.run(Duration::from_millis(5), rx));
        tx.send(true).expect("monitor listening");
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("monitor stops")
            .expect("monitor task joins");
    }
}
