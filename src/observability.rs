//! Observability stubs (metrics, tracing)

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    reports_accepted: AtomicU64,
    reports_failed: AtomicU64,
    forwards_succeeded: AtomicU64,
    forwards_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report_accepted(&self) {
        self.reports_accepted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "reports_accepted", "Metric incremented");
    }

    pub fn report_failed(&self) {
        self.reports_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "reports_failed", "Metric incremented");
    }

    pub fn forward_succeeded(&self) {
        self.forwards_succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "forwards_succeeded", "Metric incremented");
    }

    pub fn forward_failed(&self) {
        self.forwards_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "forwards_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            reports_accepted: self.reports_accepted.load(Ordering::Relaxed),
            reports_failed: self.reports_failed.load(Ordering::Relaxed),
            forwards_succeeded: self.forwards_succeeded.load(Ordering::Relaxed),
            forwards_failed: self.forwards_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub reports_accepted: u64,
    pub reports_failed: u64,
    pub forwards_succeeded: u64,
    pub forwards_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = Metrics::new();
        metrics.report_accepted();
        metrics.report_accepted();
        metrics.forward_failed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.reports_accepted, 2);
        assert_eq!(snapshot.reports_failed, 0);
        assert_eq!(snapshot.forwards_failed, 1);
    }
}
