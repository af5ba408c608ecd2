//! Cache Store Module
//!
//! Bounded map of canonical request lines to origin responses. Not
//! synchronised on its own; see `ResponseCache` for the shared handle.

use std::collections::HashMap;

use bytes::Bytes;
use tracing::debug;

use crate::cache::{CacheStats, CachedResponse, EvictionPolicy, EvictionTracker};

// == Cache Snapshot ==
/// Point-in-time view of the store, read under a single lock.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    pub stats: CacheStats,
    pub capacity: usize,
    pub policy: EvictionPolicy,
    /// Total size of every stored response
    pub stored_bytes: usize,
    /// Age of the longest-held entry, None when empty
    pub oldest_entry_age_secs: Option<i64>,
}

// == Cache Store ==
/// Fixed-capacity response storage with a pluggable eviction policy.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CachedResponse>,
    /// Victim selection bookkeeping
    eviction: EvictionTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed, always at least 1
    capacity: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of responses held; 0 is raised to 1
    /// * `policy` - How to pick a victim when full
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            eviction: EvictionTracker::new(policy),
            stats: CacheStats::new(),
            capacity,
        }
    }

    // == Get ==
    /// Looks up a stored response, recording a hit or miss.
    pub fn get(&mut self, key: &str) -> Option<Bytes> {
        match self.entries.get(key) {
            Some(entry) => {
                let body = entry.body.clone();
                self.stats.record_hit();
                self.eviction.touch(key);
                Some(body)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Put ==
    /// Stores a response under `key`.
    ///
    /// An existing key is overwritten in place. A new key arriving at a full
    /// store first evicts exactly one entry. Returns the evicted key, if any.
    pub fn put(&mut self, key: String, body: Bytes) -> Option<String> {
        let mut evicted = None;

        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            if let Some(victim) = self.eviction.select_victim(self.entries.keys()) {
                self.entries.remove(&victim);
                self.eviction.remove(&victim);
                self.stats.record_eviction();
                debug!(key = %victim.trim_end(), "evicted cached response");
                evicted = Some(victim);
            }
        }

        self.eviction.touch(&key);
        self.entries.insert(key, CachedResponse::new(body));
        self.stats.record_insertion();
        self.stats.set_total_entries(self.entries.len());

        evicted
    }

    /// Checks for a key without touching statistics or recency.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Captures statistics, configuration and entry sizes/ages together.
    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            stats: self.stats(),
            capacity: self.capacity,
            policy: self.eviction.policy(),
            stored_bytes: self.entries.values().map(CachedResponse::size).sum(),
            oldest_entry_age_secs: self.entries.values().map(CachedResponse::age_secs).max(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
