use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Request counters exposed at /metrics
#[derive(Clone, Default)]
pub struct RequestMetrics {
    inner: Arc<RequestMetricsInner>,
}

#[derive(Default)]
struct RequestMetricsInner {
    /// Requests to /api/logs, accepted or not
    log_requests: AtomicU64,

    /// Requests refused because the file reference left the log root
    rejected_paths: AtomicU64,

    /// Records returned across all accepted requests
    records_served: AtomicU64,

    /// Directory scans for /api/files and /api/stats
    listings: AtomicU64,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_request(&self) {
        self.inner.log_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn path_rejected(&self) {
        self.inner.rejected_paths.fetch_add(1, Ordering::Relaxed);
    }

    pub fn records_served(&self, count: usize) {
        self.inner.records_served.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn listing(&self) {
        self.inner.listings.fetch_add(1, Ordering::Relaxed);
    }

    pub fn log_requests(&self) -> u64 {
        self.inner.log_requests.load(Ordering::Relaxed)
    }

    pub fn rejected_paths(&self) -> u64 {
        self.inner.rejected_paths.load(Ordering::Relaxed)
    }

    pub fn total_records_served(&self) -> u64 {
        self.inner.records_served.load(Ordering::Relaxed)
    }

    pub fn listings(&self) -> u64 {
        self.inner.listings.load(Ordering::Relaxed)
    }
}
