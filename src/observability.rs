//! Logging setup and conversion counters

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "audiograb=info";

/// Install the global fmt subscriber, honoring `RUST_LOG`.
///
/// Logs go to stderr so stdout stays clean for command output.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    attempts: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    rejected_busy: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempt_started(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "attempts", "Metric incremented");
    }

    pub fn attempt_succeeded(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "succeeded", "Metric incremented");
    }

    pub fn attempt_failed(&self, code: &'static str) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "failed", code, "Metric incremented");
    }

    pub fn busy_rejected(&self) {
        self.rejected_busy.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "rejected_busy", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            rejected_busy: self.rejected_busy.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub attempts: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub rejected_busy: u64,
}
