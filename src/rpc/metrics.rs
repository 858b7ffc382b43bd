//! Lightweight counters tracking transport attempts, retries, and latency so
//! the client can expose aggregated snapshots without leaking implementation
//! details to downstream consumers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct TransportMetrics {
    total_attempts: AtomicU64,
    total_retries: AtomicU64,
    total_failures: AtomicU64,
    total_latency_ns: AtomicU64,
}

impl TransportMetrics {
    pub(crate) fn record_success(&self, latency: Duration) {
        self.total_attempts.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_retry(&self, latency: Duration) {
        self.total_attempts.fetch_add(1, Ordering::Relaxed);
        self.total_retries.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self, latency: Duration) {
        self.total_attempts.fetch_add(1, Ordering::Relaxed);
        self.total_failures.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> TransportMetricsSnapshot {
        let total_attempts = self.total_attempts.load(Ordering::Relaxed);
        let total_failures = self.total_failures.load(Ordering::Relaxed);
        let total_latency_ns = self.total_latency_ns.load(Ordering::Relaxed);

        let average_latency_ms = if total_attempts == 0 {
            0.0
        } else {
            (total_latency_ns as f64 / total_attempts as f64) / 1_000_000.0
        };

        TransportMetricsSnapshot {
            total_attempts,
            total_retries: self.total_retries.load(Ordering::Relaxed),
            total_failures,
            average_latency_ms,
        }
    }
}

/// Aggregated view of the transport's attempt counters.
#[derive(Debug, Copy, Clone)]
pub struct TransportMetricsSnapshot {
    pub total_attempts: u64,
    pub total_retries: u64,
    pub total_failures: u64,
    pub average_latency_ms: f64,
}
