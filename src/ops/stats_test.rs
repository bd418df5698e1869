//! Unit tests for the statistics tracker

use super::cache::CacheStats;
use super::stats::StatsTracker;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn empty_tracker_guards_derived_rates() {
    let tracker = StatsTracker::new();
    let stats = tracker.snapshot();
    assert_eq!(stats.total_operations, 0);
    assert_eq!(stats.cache_hit_rate, 0.0);
    assert_eq!(stats.average_duration, Duration::ZERO);
}

#[test]
fn hit_and_miss_counts_derive_hit_rate() {
    let tracker = StatsTracker::new();
    tracker.record_hit(Duration::from_millis(5));
    tracker.record_execution(Duration::from_millis(20), true);
    tracker.record_execution(Duration::from_millis(30), true);
    tracker.record_execution(Duration::from_millis(25), false);

    let stats = tracker.snapshot();
    assert_eq!(stats.total_operations, 4);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.cache_misses, 3);
    assert_eq!(stats.errors, 1);
    assert!((stats.cache_hit_rate - 0.25).abs() < 1e-9);
    assert_eq!(stats.average_duration, Duration::from_millis(20));
}

#[test]
fn pending_gauge_tracks_admission_and_completion() {
    let tracker = StatsTracker::new();
    tracker.operation_admitted();
    tracker.operation_admitted();
    assert_eq!(tracker.snapshot().pending_operations, 2);

    tracker.operation_finished();
    assert_eq!(tracker.snapshot().pending_operations, 1);
}

#[test]
fn pending_gauge_saturates_at_zero() {
    let tracker = StatsTracker::new();
    tracker.operation_admitted();
    tracker.operation_finished();
    tracker.operation_finished();
    tracker.operation_finished();
    assert_eq!(tracker.snapshot().pending_operations, 0);
}

#[test]
fn pending_gauge_never_negative_under_concurrency() {
    let tracker = Arc::new(StatsTracker::new());
    let mut handles = Vec::new();

    // More decrements than increments from racing threads.
    for worker in 0..8 {
        let tracker = Arc::clone(&tracker);
        handles.push(std::thread::spawn(move || {
            for _ in 0..1000 {
                if worker % 2 == 0 {
                    tracker.operation_admitted();
                }
                tracker.operation_finished();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // u64 gauge: any underflow would show up as an enormous value.
    assert!(tracker.snapshot().pending_operations <= 4000);
}

#[test]
fn cache_snapshot_is_carried_into_the_view() {
    let tracker = StatsTracker::new();
    tracker.update_cache_snapshot(CacheStats {
        size: 7,
        capacity: 10,
        utilization: 0.7,
    });

    let stats = tracker.snapshot();
    assert_eq!(stats.cache.size, 7);
    assert_eq!(stats.cache.capacity, 10);
}

#[test]
fn reset_zeroes_counters_and_snapshot() {
    let tracker = StatsTracker::new();
    tracker.record_hit(Duration::from_millis(5));
    tracker.record_execution(Duration::from_millis(10), false);
    tracker.operation_admitted();
    tracker.update_cache_snapshot(CacheStats {
        size: 3,
        capacity: 10,
        utilization: 0.3,
    });

    tracker.reset();
    let stats = tracker.snapshot();
    assert_eq!(stats.total_operations, 0);
    assert_eq!(stats.errors, 0);
    assert_eq!(stats.pending_operations, 0);
    assert_eq!(stats.cache.size, 0);
    assert_eq!(stats.total_duration, Duration::ZERO);
}

#[test]
fn snapshot_serializes_to_json() {
    let tracker = StatsTracker::new();
    tracker.record_execution(Duration::from_millis(10), true);
    let json = tracker.snapshot().to_json().unwrap();
    assert!(json.contains("\"total_operations\": 1"));
}
