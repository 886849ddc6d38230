//! Optional per-operation query logging.

use std::future::Future;

use tokio::time::Instant;
use tracing::info;

/// Logs each store operation with its elapsed time when enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryLog {
    enabled: bool,
}

impl QueryLog {
    /// Build a logger.
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Whether operations are logged.
    pub const fn is_enabled(self) -> bool {
        self.enabled
    }

    /// Await `fut`, logging `operation` and its duration if enabled.
    pub async fn run<F, T, E>(self, operation: &'static str, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        if !self.enabled {
            return fut.await;
        }
        let started = Instant::now();
        let result = fut.await;
        info!(
            operation,
            ok = result.is_ok(),
            elapsed_us = started.elapsed().as_micros(),
            "db query"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_results_through_in_both_modes() {
        for log in [QueryLog::new(false), QueryLog::new(true)] {
            let ok: Result<u8, ()> = log.run("ok", async { Ok(1) }).await;
            let err: Result<u8, &str> = log.run("err", async { Err("boom") }).await;
            assert_eq!(ok, Ok(1));
            assert_eq!(err, Err("boom"));
        }
    }
}
