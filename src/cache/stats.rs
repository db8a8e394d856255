//! Cache Statistics Module
//!
//! Tracks engine counters including hits, misses, and tier movements.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Engine Stats ==
/// Lock-free counters for engine activity.
///
/// Counters live outside the tier lock so the hot read path and status
/// reporting never need exclusive access just to bump a number. Relaxed
/// ordering is enough; the counts are diagnostics, not synchronization.
#[derive(Debug, Default)]
pub struct EngineStats {
    /// Number of successful retrievals (either tier)
    hits: AtomicU64,
    /// Number of failed retrievals (absent or expired)
    misses: AtomicU64,
    /// Number of entries pulled back into the primary tier on read
    promotions: AtomicU64,
    /// Number of entries transferred to the secondary tier
    demotions: AtomicU64,
    /// Number of entries permanently removed by expiration
    expirations: AtomicU64,
    /// Number of durable reads, writes, or deletes that failed
    storage_failures: AtomicU64,
}

impl EngineStats {
    // == Constructor ==
    /// Creates a new EngineStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Promotion ==
    /// Increments the promotion counter.
    pub fn record_promotion(&self) {
        self.promotions.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Demotion ==
    /// Increments the demotion counter.
    pub fn record_demotion(&self) {
        self.demotions.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Expiration ==
    /// Increments the expiration counter.
    pub fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Storage Failure ==
    /// Increments the storage failure counter.
    pub fn record_storage_failure(&self) {
        self.storage_failures.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Captures the current counter values with the given tier sizes.
    ///
    /// # Arguments
    /// * `primary_entries` - Entries resident in the primary tier
    /// * `secondary_entries` - Keys tracked by the shadow index
    pub fn snapshot(&self, primary_entries: usize, secondary_entries: usize) -> StatusSnapshot {
        StatusSnapshot {
            primary_entries,
            secondary_entries,
            total_entries: primary_entries + secondary_entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
            demotions: self.demotions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            storage_failures: self.storage_failures.load(Ordering::Relaxed),
        }
    }
}

// == Status Snapshot ==
/// Point-in-time view of the engine, as returned by status queries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusSnapshot {
    /// Entries resident in the primary tier
    pub primary_entries: usize,
    /// Keys tracked by the shadow index (secondary tier residents)
    pub secondary_entries: usize,
    /// Sum of both tiers
    pub total_entries: usize,
    /// Number of successful retrievals
    pub hits: u64,
    /// Number of failed retrievals
    pub misses: u64,
    /// Entries promoted back to the primary tier on read
    pub promotions: u64,
    /// Entries transferred to the secondary tier
    pub demotions: u64,
    /// Entries permanently removed by expiration
    pub expirations: u64,
    /// Durable operations that failed
    pub storage_failures: u64,
}

impl StatusSnapshot {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
