//! Cache Module
//!
//! Bounded, shared store of origin responses keyed by canonical request line.

mod entry;
mod eviction;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::CachedResponse;
pub use eviction::{EvictionPolicy, EvictionTracker, ParsePolicyError};
pub use shared::ResponseCache;
pub use stats::CacheStats;
pub use store::{CacheSnapshot, CacheStore};
