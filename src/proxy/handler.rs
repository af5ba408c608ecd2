//! Connection Handler
//!
//! Runs one client connection through
//! `ReadingRequest -> Parsing -> CacheLookup -> {CacheHit | Forwarding} -> Respond`.
//! The stream is owned by the handler, so it is closed on every exit path.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::cache::ResponseCache;
use crate::error::{ProxyError, Result};
use crate::http::{contains_terminator, send_message, MessageFramer, RequestDescriptor};
use crate::proxy::Origin;

/// How a connection ended when nothing went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Client closed before sending anything
    NoRequest,
    /// Response came from the cache
    CacheHit,
    /// Response came from the origin and was cached
    Forwarded,
    /// Origin sent nothing back; nothing cached, nothing relayed
    EmptyResponse,
}

/// Per-connection control flow shared by every connection task.
#[derive(Debug)]
pub struct ConnectionHandler<O> {
    cache: ResponseCache,
    origin: Arc<O>,
    framer: MessageFramer,
}

impl<O: Origin> ConnectionHandler<O> {
    pub fn new(cache: ResponseCache, origin: Arc<O>, framer: MessageFramer) -> Self {
        Self {
            cache,
            origin,
            framer,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Handles one connection and logs how it ended. Errors stop here.
    pub async fn serve<S>(&self, stream: S, peer: SocketAddr, id: u64)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let span = info_span!("connection", id, %peer);
        async {
            match self.handle(stream).await {
                Ok(outcome) => debug!(?outcome, "connection closed"),
                Err(e) => warn!(error = %e, "connection failed"),
            }
        }
        .instrument(span)
        .await
    }

    /// Drives one connection to completion.
    pub async fn handle<S>(&self, mut stream: S) -> Result<Outcome>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        // ReadingRequest
        let request = self.framer.read_message(&mut stream).await?;
        if request.is_empty() {
            return Ok(Outcome::NoRequest);
        }
        if !contains_terminator(&request) {
            return Err(ProxyError::Parse(
                "client closed before finishing the request headers".to_string(),
            ));
        }

        // Parsing
        let descriptor = RequestDescriptor::parse(&request)?;
        if !descriptor.is_get() {
            debug!(method = %descriptor.method, "non-GET request shares the GET cache key");
        }

        // CacheLookup
        let (response, outcome) = match self.cache.get(&descriptor.cache_key).await {
            Some(cached) => {
                info!(host = %descriptor.host, url = %descriptor.url, "serving from cache");
                (cached, Outcome::CacheHit)
            }
            None => self.forward(&descriptor, &request).await?,
        };

        // Respond
        send_message(&mut stream, &response).await?;
        if let Err(e) = stream.shutdown().await {
            debug!(error = %e, "shutdown after response failed");
        }

        Ok(outcome)
    }

    /// Fetches from the origin and caches a non-empty response.
    async fn forward(
        &self,
        descriptor: &RequestDescriptor,
        request: &[u8],
    ) -> Result<(Bytes, Outcome)> {
        info!(host = %descriptor.host, url = %descriptor.url, "forwarding to origin");
        let response = self.origin.fetch(&descriptor.host, request).await?;

        if response.is_empty() {
            return Ok((response, Outcome::EmptyResponse));
        }

        self.cache
            .put(descriptor.cache_key.clone(), response.clone())
            .await;
        Ok((response, Outcome::Forwarded))
    }
}
