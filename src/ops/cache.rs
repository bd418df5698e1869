//! Bounded LRU cache with per-entry expiration for git command results
//!
//! This module handles:
//! - Deterministic cache-key derivation from command inputs
//! - Least-recently-used eviction under a fixed size limit
//! - Per-entry TTL with removal on expired access
//! - Category-scoped and full invalidation

use crate::core::types::{GitCommandResult, GitOperation};
use lru::LruCache;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;

/// Opaque digest identifying one cached command result
///
/// Derived from the operation category, argument list, working directory and
/// active branch. Any difference in any of the four inputs produces a
/// different key, which is how a branch switch invalidates stale cached
/// answers without explicit invalidation logic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a command in the given context
    ///
    /// Pure and deterministic: identical inputs always yield identical keys.
    pub fn derive(
        operation: GitOperation,
        args: &[String],
        working_dir: &Path,
        branch: &str,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(operation.verb().as_bytes());
        hasher.update([0u8]);
        for arg in args {
            hasher.update(arg.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(working_dir.to_string_lossy().as_bytes());
        hasher.update([0u8]);
        hasher.update(branch.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point-in-time cache utilization snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Current entry count
    pub size: usize,
    /// Configured size limit
    pub capacity: usize,
    /// `size / capacity`, zero for an unbounded-free cache
    pub utilization: f64,
}

struct CacheEntry {
    result: GitCommandResult,
    expires_at: Instant,
}

/// Bounded store of prior command results with LRU eviction and TTL
///
/// All mutating operations, including `get` (which reorders the LRU list),
/// serialize behind one writer lock. Cache operations are cheap relative to
/// the subprocess invocations they avoid, so the coarse lock is not a
/// contention concern at the expected scale.
pub struct OperationCache {
    entries: RwLock<LruCache<CacheKey, CacheEntry>>,
    capacity: usize,
    default_ttl: Duration,
}

impl OperationCache {
    /// Create a cache holding at most `capacity` entries
    ///
    /// `capacity` is clamped to at least one entry.
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        let capacity = capacity.max(1);
        let bound = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RwLock::new(LruCache::new(bound)),
            capacity,
            default_ttl,
        }
    }

    /// Look up a result, promoting the entry to most recently used
    ///
    /// An entry found past its expiration is removed as a side effect and
    /// reported as absent. A hit returns a copy flagged as served from
    /// cache; the stored entry is never handed out by reference.
    pub fn get(&self, key: &CacheKey) -> Option<GitCommandResult> {
        let mut entries = self.entries.write();
        let expired = match entries.get(key) {
            Some(entry) => {
                if Instant::now() < entry.expires_at {
                    let mut result = entry.result.clone();
                    result.cache_hit = true;
                    result.cached = true;
                    return Some(result);
                }
                true
            }
            None => false,
        };
        if expired {
            entries.pop(key);
            debug!(%key, "removed expired cache entry on access");
        }
        None
    }

    /// Store a result under `key`
    ///
    /// `ttl` of `None` applies the default TTL. An existing key is replaced
    /// in place with a fresh expiry and promoted; a new key evicts
    /// least-recently-used entries until there is room.
    pub fn insert(&self, key: CacheKey, result: GitCommandResult, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry {
            result,
            expires_at: Instant::now() + ttl,
        };

        let mut entries = self.entries.write();
        if entries.contains(&key) {
            entries.put(key, entry);
            return;
        }
        while entries.len() >= self.capacity {
            match entries.pop_lru() {
                Some((evicted, _)) => debug!(key = %evicted, "evicted least recently used entry"),
                None => break,
            }
        }
        entries.put(key, entry);
    }

    /// Remove every entry whose result belongs to `operation`
    ///
    /// Linear in the current entry count. Returns the number removed.
    pub fn clear_operation(&self, operation: GitOperation) -> usize {
        let mut entries = self.entries.write();
        let matching: Vec<CacheKey> = entries
            .iter()
            .filter(|(_, entry)| entry.result.operation == operation)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &matching {
            entries.pop(key);
        }
        if !matching.is_empty() {
            debug!(operation = %operation, removed = matching.len(), "cleared cache entries");
        }
        matching.len()
    }

    /// Reset the store to empty, returning the prior entry count
    pub fn clear_all(&self) -> usize {
        let mut entries = self.entries.write();
        let removed = entries.len();
        entries.clear();
        removed
    }

    /// Remove all entries past expiration without requiring an access
    ///
    /// Intended for periodic background maintenance. Returns the number
    /// removed.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let expired: Vec<CacheKey> = entries
            .iter()
            .filter(|(_, entry)| now >= entry.expires_at)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    /// Current entry count
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache currently holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Current utilization snapshot
    pub fn stats(&self) -> CacheStats {
        let size = self.entries.read().len();
        CacheStats {
            size,
            capacity: self.capacity,
            utilization: size as f64 / self.capacity as f64,
        }
    }
}
