//! Proxy Server
//!
//! Binds the listening socket and runs the accept loop, one task per
//! accepted connection.

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpSocket};
use tracing::{debug, error, info};

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::http::MessageFramer;
use crate::proxy::{ConnectionHandler, Origin, TcpOrigin};

/// Pause after a failed accept so a persistent failure (e.g. EMFILE) does
/// not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// A bound proxy, ready to accept connections.
pub struct ProxyServer<O> {
    listener: TcpListener,
    handler: Arc<ConnectionHandler<O>>,
    next_id: AtomicU64,
}

impl ProxyServer<TcpOrigin> {
    /// Binds `0.0.0.0:<listen_port>` and forwards misses over TCP.
    pub fn bind(config: &Config, cache: ResponseCache) -> Result<Self> {
        Self::with_origin(config, cache, TcpOrigin::from_config(config))
    }
}

impl<O: Origin> ProxyServer<O> {
    /// Binds `0.0.0.0:<listen_port>` using a caller-supplied origin.
    pub fn with_origin(config: &Config, cache: ResponseCache, origin: O) -> Result<Self> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.listen_port));
        let listener = listen(addr, config.listen_backlog).map_err(ProxyError::SocketSetup)?;

        info!(
            address = %addr,
            backlog = config.listen_backlog,
            "proxy listening"
        );

        let handler = ConnectionHandler::new(
            cache,
            Arc::new(origin),
            MessageFramer::from_config(config),
        );

        Ok(Self {
            listener,
            handler: Arc::new(handler),
            next_id: AtomicU64::new(1),
        })
    }

    /// Address actually bound, useful when listening on port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(ProxyError::SocketSetup)
    }

    pub fn cache(&self) -> &ResponseCache {
        self.handler.cache()
    }

    /// Accepts connections until `shutdown` resolves.
    ///
    /// Failed accepts are logged and the loop carries on. On shutdown the
    /// listener is closed; connections already accepted run to completion.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("no longer accepting connections");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                        debug!(id, %peer, "connection accepted");

                        let handler = Arc::clone(&self.handler);
                        tokio::spawn(async move {
                            handler.serve(stream, peer, id).await;
                        });
                    }
                    Err(e) => {
                        error!(error = %ProxyError::Accept(e), "accept failed");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
            }
        }
    }
}

fn listen(addr: SocketAddr, backlog: u32) -> std::io::Result<TcpListener> {
    let socket = TcpSocket::new_v4()?;
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(backlog)
}
