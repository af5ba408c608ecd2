//! Origin Client
//!
//! Forwards a raw request to the origin host and reads back its raw response.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::http::{contains_terminator, send_message, MessageFramer};

/// Something that can answer a raw request on behalf of `host`.
pub trait Origin: Send + Sync + 'static {
    /// Sends `request` to `host` and returns the raw response.
    ///
    /// An origin that closes without answering, or before finishing its
    /// header block, yields an empty response, not an error.
    fn fetch(&self, host: &str, request: &[u8]) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Plain TCP origin client: one fresh IPv4 connection per request.
#[derive(Debug, Clone)]
pub struct TcpOrigin {
    port: u16,
    connect_timeout: Option<Duration>,
    framer: MessageFramer,
}

impl TcpOrigin {
    pub fn new(port: u16, connect_timeout: Option<Duration>, framer: MessageFramer) -> Self {
        Self {
            port,
            connect_timeout,
            framer,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.origin_port,
            config.connect_timeout(),
            MessageFramer::from_config(config),
        )
    }

    /// Returns the first IPv4 address `host` resolves to.
    async fn resolve(&self, host: &str) -> Result<SocketAddr> {
        let mut addrs = lookup_host((host, self.port))
            .await
            .map_err(|e| ProxyError::Resolution {
                host: host.to_string(),
                source: Some(e),
            })?;

        addrs.find(SocketAddr::is_ipv4).ok_or_else(|| ProxyError::Resolution {
            host: host.to_string(),
            source: None,
        })
    }

    async fn connect(&self, host: &str, addr: SocketAddr) -> Result<TcpStream> {
        let connect_err = |source| ProxyError::Connect {
            host: host.to_string(),
            source,
        };

        match self.connect_timeout {
            Some(limit) => timeout(limit, TcpStream::connect(addr))
                .await
                .map_err(|_| {
                    connect_err(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("no answer within {:?}", limit),
                    ))
                })?
                .map_err(connect_err),
            None => TcpStream::connect(addr).await.map_err(connect_err),
        }
    }
}

impl Origin for TcpOrigin {
    async fn fetch(&self, host: &str, request: &[u8]) -> Result<Bytes> {
        let addr = self.resolve(host).await?;
        debug!(%host, %addr, "connecting to origin");

        let mut stream = self.connect(host, addr).await?;
        send_message(&mut stream, request).await?;

        let response = self.framer.read_message(&mut stream).await?;
        if response.is_empty() {
            warn!(%host, "origin closed without a response");
            return Ok(response);
        }
        if !contains_terminator(&response) {
            warn!(
                %host,
                received = response.len(),
                "origin closed mid-headers, discarding partial response"
            );
            return Ok(Bytes::new());
        }
        Ok(response)
    }
}
