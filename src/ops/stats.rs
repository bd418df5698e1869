//! Operation statistics tracking
//!
//! Counters are independently synchronized atomics updated from many
//! workers without cross-counter atomicity: a snapshot read may observe
//! counters from slightly different instants under concurrent writers,
//! which is acceptable for monitoring data.

use crate::ops::cache::CacheStats;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Derived statistics view returned by [`StatsTracker::snapshot`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationStats {
    /// Completed operations, cached and executed alike
    pub total_operations: u64,
    /// Operations served from the cache
    pub cache_hits: u64,
    /// Operations that reached the executor
    pub cache_misses: u64,
    /// Operations whose final result was a failure
    pub errors: u64,
    /// `cache_hits / total_operations`, zero before any operation
    pub cache_hit_rate: f64,
    /// Cumulative execution time across all operations
    pub total_duration: Duration,
    /// `total_duration / total_operations`, zero before any operation
    pub average_duration: Duration,
    /// Commands admitted for execution but not yet completed
    pub pending_operations: u64,
    /// Most recent cache utilization snapshot
    pub cache: CacheStats,
}

impl OperationStats {
    /// Serialize this snapshot to a JSON string
    pub fn to_json(&self) -> crate::core::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Lock-free counters plus a periodically refreshed cache snapshot
///
/// Owned by one manager instance; constructed and reset explicitly rather
/// than living as process-wide state.
pub struct StatsTracker {
    total_operations: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    errors: AtomicU64,
    total_duration_micros: AtomicU64,
    pending_operations: AtomicU64,
    cache_snapshot: RwLock<CacheStats>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            total_operations: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            total_duration_micros: AtomicU64::new(0),
            pending_operations: AtomicU64::new(0),
            cache_snapshot: RwLock::new(CacheStats::default()),
        }
    }

    /// Record an operation served from the cache
    pub fn record_hit(&self, duration: Duration) {
        self.total_operations.fetch_add(1, Ordering::Relaxed);
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        self.total_duration_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Record an operation that reached the executor
    pub fn record_execution(&self, duration: Duration, success: bool) {
        self.total_operations.fetch_add(1, Ordering::Relaxed);
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        self.total_duration_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Note a command admitted for execution
    pub fn operation_admitted(&self) {
        self.pending_operations.fetch_add(1, Ordering::SeqCst);
    }

    /// Note a command completing execution
    ///
    /// The gauge saturates at zero: a decrement racing ahead of its
    /// increment must never drive it negative, so the subtraction runs in a
    /// compare-and-retry loop rather than as a plain decrement.
    pub fn operation_finished(&self) {
        let _ = self
            .pending_operations
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                current.checked_sub(1)
            });
    }

    /// Replace the stored cache utilization snapshot
    pub fn update_cache_snapshot(&self, snapshot: CacheStats) {
        *self.cache_snapshot.write() = snapshot;
    }

    /// Produce the derived statistics view
    pub fn snapshot(&self) -> OperationStats {
        let total = self.total_operations.load(Ordering::Relaxed);
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let total_micros = self.total_duration_micros.load(Ordering::Relaxed);

        OperationStats {
            total_operations: total,
            cache_hits: hits,
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            cache_hit_rate: if total == 0 {
                0.0
            } else {
                hits as f64 / total as f64
            },
            total_duration: Duration::from_micros(total_micros),
            average_duration: if total == 0 {
                Duration::ZERO
            } else {
                Duration::from_micros(total_micros / total)
            },
            pending_operations: self.pending_operations.load(Ordering::SeqCst),
            cache: self.cache_snapshot.read().clone(),
        }
    }

    /// Zero all counters and the cache snapshot
    pub fn reset(&self) {
        self.total_operations.store(0, Ordering::SeqCst);
        self.cache_hits.store(0, Ordering::SeqCst);
        self.cache_misses.store(0, Ordering::SeqCst);
        self.errors.store(0, Ordering::SeqCst);
        self.total_duration_micros.store(0, Ordering::SeqCst);
        self.pending_operations.store(0, Ordering::SeqCst);
        *self.cache_snapshot.write() = CacheStats::default();
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}
