//! Message Framer
//!
//! Reads one raw HTTP message from a byte stream and writes raw messages back.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{ProxyError, Result};

/// End-of-message marker.
pub const TERMINATOR: &[u8; 4] = b"\r\n\r\n";

/// Accumulates stream reads into a single message.
#[derive(Debug, Clone)]
pub struct MessageFramer {
    /// Bytes requested per read
    chunk_size: usize,
    /// Ceiling on the accumulated message
    max_message_bytes: usize,
    /// Deadline for each individual read
    read_timeout: Option<Duration>,
    /// Deadline for the whole message, however it trickles in
    message_timeout: Option<Duration>,
}

impl MessageFramer {
    pub fn new(chunk_size: usize, max_message_bytes: usize, read_timeout: Option<Duration>) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            max_message_bytes,
            read_timeout,
            message_timeout: None,
        }
    }

    /// Caps the total time spent framing one message.
    pub fn with_message_timeout(mut self, limit: Option<Duration>) -> Self {
        self.message_timeout = limit;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.read_chunk_size,
            config.max_message_bytes,
            config.read_timeout(),
        )
        .with_message_timeout(config.message_timeout())
    }

    /// Reads until the accumulated bytes end with `\r\n\r\n` or the peer
    /// closes the stream.
    ///
    /// The terminator is only checked against the last four bytes after each
    /// read, so data that arrives in the same read after a terminator keeps
    /// the loop going until EOF. Everything read is kept.
    ///
    /// A read error ends the message with whatever was accumulated; an empty
    /// result means "no message" and is not an error. A read that stays idle
    /// past the deadline fails with `FramingTimeout`, and a message still
    /// incomplete at the overall deadline fails with `MessageTimeout`.
    pub async fn read_message<R>(&self, reader: &mut R) -> Result<Bytes>
    where
        R: AsyncRead + Unpin,
    {
        match self.message_timeout {
            Some(limit) => timeout(limit, self.accumulate(reader))
                .await
                .map_err(|_| ProxyError::MessageTimeout(limit))?,
            None => self.accumulate(reader).await,
        }
    }

    async fn accumulate<R>(&self, reader: &mut R) -> Result<Bytes>
    where
        R: AsyncRead + Unpin,
    {
        let mut message = BytesMut::new();
        let mut chunk = vec![0u8; self.chunk_size];

        loop {
            let read = match self.read_timeout {
                Some(limit) => timeout(limit, reader.read(&mut chunk))
                    .await
                    .map_err(|_| ProxyError::FramingTimeout(limit))?,
                None => reader.read(&mut chunk).await,
            };

            let n = match read {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    debug!(error = %e, accumulated = message.len(), "read ended with error");
                    break;
                }
            };

            if message.len() + n > self.max_message_bytes {
                return Err(ProxyError::MessageTooLarge {
                    limit: self.max_message_bytes,
                });
            }
            message.extend_from_slice(&chunk[..n]);
            trace!(read = n, total = message.len(), "framer read");

            if ends_with_terminator(&message) {
                break;
            }
        }

        Ok(message.freeze())
    }
}

impl Default for MessageFramer {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// True once the last four bytes are the terminator. Shorter buffers never
/// match.
fn ends_with_terminator(buf: &[u8]) -> bool {
    buf.len() >= TERMINATOR.len() && buf.ends_with(TERMINATOR)
}

/// True if the terminator appears anywhere in `buf`, i.e. the header block
/// was received in full.
pub fn contains_terminator(buf: &[u8]) -> bool {
    buf.windows(TERMINATOR.len()).any(|w| w == TERMINATOR)
}

/// Writes a whole message and flushes it.
pub async fn send_message<W>(writer: &mut W, message: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let send_err = |source| ProxyError::Send {
        expected: message.len(),
        source,
    };
    writer.write_all(message).await.map_err(send_err)?;
    writer.flush().await.map_err(send_err)?;
    Ok(())
}
