//! Cache Entry Module
//!
//! Defines the structure stored against each cache key.

use bytes::Bytes;
use chrono::{DateTime, Utc};

// == Cached Response ==
/// A raw origin response together with when it entered the cache.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// The framed response exactly as the origin sent it
    pub body: Bytes,
    /// When the response was stored
    pub stored_at: DateTime<Utc>,
}

impl CachedResponse {
    // == Constructor ==
    /// Wraps a response, stamping it with the current time.
    pub fn new(body: Bytes) -> Self {
        Self {
            body,
            stored_at: Utc::now(),
        }
    }

    /// Size of the stored response in bytes.
    pub fn size(&self) -> usize {
        self.body.len()
    }

    /// Seconds since the response was stored.
    pub fn age_secs(&self) -> i64 {
        (Utc::now() - self.stored_at).num_seconds().max(0)
    }
}
