//! Eviction Module
//!
//! Chooses which cached response to drop when the cache is full.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

// == Eviction Policy ==
/// Victim selection strategy for a full cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Drop the least recently stored or served response.
    #[default]
    Lru,
    /// Drop whichever key the map iterator yields first. No recency or
    /// frequency meaning; with a randomly seeded hasher this is effectively
    /// random replacement.
    Arbitrary,
}

#[derive(Debug, Error)]
#[error("unknown eviction policy '{0}' (expected 'lru' or 'arbitrary')")]
pub struct ParsePolicyError(String);

impl FromStr for EvictionPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(Self::Lru),
            "arbitrary" | "random" => Ok(Self::Arbitrary),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lru => f.write_str("lru"),
            Self::Arbitrary => f.write_str("arbitrary"),
        }
    }
}

// == Eviction Tracker ==
/// Bookkeeping the store consults to pick an eviction victim.
///
/// Under `Lru`, keys live in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
///
/// Under `Arbitrary` nothing is tracked.
#[derive(Debug, Default)]
pub struct EvictionTracker {
    policy: EvictionPolicy,
    order: VecDeque<String>,
}

impl EvictionTracker {
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            policy,
            order: VecDeque::new(),
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    // == Touch ==
    /// Marks a key as just used.
    pub fn touch(&mut self, key: &str) {
        if self.policy == EvictionPolicy::Lru {
            self.remove(key);
            self.order.push_front(key.to_string());
        }
    }

    // == Remove ==
    /// Stops tracking a key.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Select Victim ==
    /// Picks the key to evict and stops tracking it.
    ///
    /// `keys` are the keys currently stored, in the map's natural iteration
    /// order. Returns None if there is nothing to evict.
    pub fn select_victim<'a, I>(&mut self, mut keys: I) -> Option<String>
    where
        I: Iterator<Item = &'a String>,
    {
        match self.policy {
            EvictionPolicy::Lru => self.order.pop_back(),
            EvictionPolicy::Arbitrary => keys.next().cloned(),
        }
    }

    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
