//! Configuration Module
//!
//! Handles loading and managing proxy configuration. The listening port comes
//! from the command line; every tuning knob comes from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::EvictionPolicy;

/// Default number of cached responses.
pub const DEFAULT_CACHE_CAPACITY: usize = 30;

/// Default ceiling for a single framed message (10 MiB).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 10 * 1024 * 1024;

/// Proxy configuration parameters.
///
/// All values except the listening port can be configured via environment
/// variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the proxy accepts client connections on
    pub listen_port: u16,
    /// Pending-connection queue length handed to listen(2)
    pub listen_backlog: u32,
    /// Maximum number of responses the cache can hold
    pub cache_capacity: usize,
    /// Which entry to drop when the cache is full
    pub eviction_policy: EvictionPolicy,
    /// Port dialled on every origin host
    pub origin_port: u16,
    /// Bytes requested from the socket per read
    pub read_chunk_size: usize,
    /// Largest message the framer will accumulate
    pub max_message_bytes: usize,
    /// Idle deadline for each read, in seconds (0 = wait forever)
    pub read_timeout_secs: u64,
    /// Deadline for framing one whole message, in seconds (0 = no limit)
    pub message_timeout_secs: u64,
    /// Deadline for connecting to an origin, in seconds (0 = wait forever)
    pub connect_timeout_secs: u64,
    /// Port for the JSON admin API, disabled when None
    pub admin_port: Option<u16>,
}

impl Config {
    /// Creates a new Config for `listen_port`, loading the rest from
    /// environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cached responses (default: 30)
    /// - `EVICTION_POLICY` - `lru` or `arbitrary` (default: lru)
    /// - `ORIGIN_PORT` - Origin port (default: 80)
    /// - `READ_CHUNK_SIZE` - Bytes per read (default: 1024)
    /// - `MAX_MESSAGE_BYTES` - Framer ceiling (default: 10 MiB)
    /// - `READ_TIMEOUT_SECS` - Per-read deadline (default: 30)
    /// - `MESSAGE_TIMEOUT_SECS` - Whole-message deadline (default: 120)
    /// - `CONNECT_TIMEOUT_SECS` - Origin connect deadline (default: 10)
    /// - `LISTEN_BACKLOG` - Pending-connection queue (default: 10)
    /// - `ADMIN_PORT` - Admin API port (default: disabled)
    pub fn from_env(listen_port: u16) -> Self {
        let defaults = Self::default();
        Self {
            listen_port,
            listen_backlog: env_or("LISTEN_BACKLOG", defaults.listen_backlog),
            cache_capacity: env_or("CACHE_CAPACITY", defaults.cache_capacity),
            eviction_policy: env_or("EVICTION_POLICY", defaults.eviction_policy),
            origin_port: env_or("ORIGIN_PORT", defaults.origin_port),
            read_chunk_size: env_or("READ_CHUNK_SIZE", defaults.read_chunk_size),
            max_message_bytes: env_or("MAX_MESSAGE_BYTES", defaults.max_message_bytes),
            read_timeout_secs: env_or("READ_TIMEOUT_SECS", defaults.read_timeout_secs),
            message_timeout_secs: env_or("MESSAGE_TIMEOUT_SECS", defaults.message_timeout_secs),
            connect_timeout_secs: env_or("CONNECT_TIMEOUT_SECS", defaults.connect_timeout_secs),
            admin_port: env::var("ADMIN_PORT").ok().and_then(|v| v.parse().ok()),
        }
    }

    /// Per-read deadline, or None when reads may block indefinitely.
    pub fn read_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.read_timeout_secs)
    }

    /// Deadline for reading a whole message, or None when a slow peer may
    /// keep trickling bytes indefinitely.
    pub fn message_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.message_timeout_secs)
    }

    /// Origin connect deadline, or None when connects may block indefinitely.
    pub fn connect_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.connect_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: 8080,
            listen_backlog: 10,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            eviction_policy: EvictionPolicy::Lru,
            origin_port: 80,
            read_chunk_size: 1024,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            read_timeout_secs: 30,
            message_timeout_secs: 120,
            connect_timeout_secs: 10,
            admin_port: None,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
