//! Error types for the caching proxy
//!
//! Provides unified error handling using thiserror.

use std::io;
use std::time::Duration;

use thiserror::Error;

// == Proxy Error Enum ==
/// Unified error type for the caching proxy.
///
/// Only `SocketSetup` is fatal to the process. Everything else is scoped to a
/// single connection and ends at the connection handler boundary.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Creating, binding or listening on the proxy socket failed
    #[error("Socket setup failed: {0}")]
    SocketSetup(#[source] io::Error),

    /// A single accept call failed
    #[error("Accept failed: {0}")]
    Accept(#[source] io::Error),

    /// Peer sent nothing for longer than the read deadline
    #[error("No data received within {0:?}")]
    FramingTimeout(Duration),

    /// Peer kept the message open past the overall framing deadline
    #[error("Message not complete within {0:?}")]
    MessageTimeout(Duration),

    /// Peer kept sending past the configured message ceiling
    #[error("Message exceeds maximum size of {limit} bytes")]
    MessageTooLarge { limit: usize },

    /// Origin host name did not resolve to an IPv4 address
    #[error("Unable to resolve host '{host}'")]
    Resolution {
        host: String,
        #[source]
        source: Option<io::Error>,
    },

    /// TCP handshake with the origin failed or timed out
    #[error("Unable to connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },

    /// Writing a message to a peer failed
    #[error("Failed to send {expected} bytes: {source}")]
    Send {
        expected: usize,
        #[source]
        source: io::Error,
    },

    /// Request had no Host header or no usable request line
    #[error("Malformed request: {0}")]
    Parse(String),
}

// == Result Type Alias ==
/// Convenience Result type for the caching proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;
