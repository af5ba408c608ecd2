//! Cache Proxy - A multi-client caching HTTP/1.0 forward proxy
//!
//! Frames requests and responses on `\r\n\r\n`, forwards cache misses to the
//! origin on port 80 and keeps responses in a bounded, shared cache keyed by
//! a canonical `GET <url> HTTP/1.0` line.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod proxy;

pub use cache::ResponseCache;
pub use config::Config;
pub use error::{ProxyError, Result};
pub use proxy::ProxyServer;
