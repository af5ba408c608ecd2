//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing JSON bodies.

use serde::Serialize;

use crate::cache::{CacheSnapshot, EvictionPolicy};

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Requests answered from the cache
    pub hits: u64,
    /// Requests forwarded to an origin
    pub misses: u64,
    /// Responses stored
    pub insertions: u64,
    /// Responses dropped to make room
    pub evictions: u64,
    /// Current number of cached responses
    pub total_entries: usize,
    /// Maximum number of cached responses
    pub capacity: usize,
    /// Victim selection in use
    pub eviction_policy: EvictionPolicy,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Combined size of cached responses in bytes
    pub stored_bytes: usize,
    /// Seconds the oldest cached response has been held (null when empty)
    pub oldest_entry_age_secs: Option<i64>,
}

impl StatsResponse {
    /// Creates a new StatsResponse from a cache snapshot
    pub fn new(snapshot: &CacheSnapshot) -> Self {
        let stats = &snapshot.stats;
        Self {
            hits: stats.hits,
            misses: stats.misses,
            insertions: stats.insertions,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
            capacity: snapshot.capacity,
            eviction_policy: snapshot.policy,
            hit_rate: stats.hit_rate(),
            stored_bytes: snapshot.stored_bytes,
            oldest_entry_age_secs: snapshot.oldest_entry_age_secs,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStats;

    fn snapshot(stats: CacheStats, policy: EvictionPolicy) -> CacheSnapshot {
        CacheSnapshot {
            stats,
            capacity: 30,
            policy,
            stored_bytes: 0,
            oldest_entry_age_secs: None,
        }
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            insertions: 20,
            evictions: 5,
            total_entries: 15,
        };
        let resp = StatsResponse::new(&snapshot(stats, EvictionPolicy::Lru));
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.capacity, 30);
    }

    #[test]
    fn test_stats_response_serialize() {
        let resp = StatsResponse::new(&snapshot(CacheStats::new(), EvictionPolicy::Arbitrary));
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"eviction_policy\":\"arbitrary\""));
        assert!(json.contains("\"hit_rate\":0.0"));
        assert!(json.contains("\"stored_bytes\":0"));
        assert!(json.contains("\"oldest_entry_age_secs\":null"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
