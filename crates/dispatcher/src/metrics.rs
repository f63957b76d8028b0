//! Campaign counters for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters for one campaign
#[derive(Debug, Default)]
pub struct CampaignMetrics {
    processed: AtomicU64,
    delivered: AtomicU64,
    /// Deliverability check said no (or errored)
    undeliverable: AtomicU64,
    send_failures: AtomicU64,
    store_failures: AtomicU64,
    archive_failures: AtomicU64,
}

impl CampaignMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_undeliverable(&self) {
        self.undeliverable.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_send_failures(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_store_failures(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_archive_failures(&self) {
        self.archive_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            undeliverable: self.undeliverable.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            archive_failures: self.archive_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of campaign counters (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub processed: u64,
    pub delivered: u64,
    pub undeliverable: u64,
    pub send_failures: u64,
    pub store_failures: u64,
    pub archive_failures: u64,
}
