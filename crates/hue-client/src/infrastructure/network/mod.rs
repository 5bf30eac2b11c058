//! Network infrastructure for the client application.
//!
//! [`TcpTransport`] implements the application's [`Transport`] port over
//! plain TCP.  Each call is one short-lived connection:
//!
//! 1. Connect to the endpoint (bounded by `connect_timeout`).
//! 2. Write the packet fully and flush (bounded by `io_timeout`).
//! 3. If a response is wanted, read until the peer closes or `io_timeout`
//!    passes, whichever comes first, keeping at most `max_response_bytes`.
//!    A peer that answers and then holds the socket open still yields its
//!    answer.
//! 4. Shut the stream down, whatever happened in steps 2 and 3.
//!
//! Steps 2 to 4 are written against `AsyncRead + AsyncWrite` rather than
//! `TcpStream`, so tests can drive them with scripted in-memory streams.

pub mod mock;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    time,
};
use tracing::debug;

use crate::application::transport::{Endpoint, Transport, TransportError};

/// Timeouts and limits for [`TcpTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpTransportConfig {
    /// Upper bound on establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Upper bound on the write, and separately on the response read.
    pub io_timeout: Duration,
    /// Largest response accepted; anything longer is an error.
    pub max_response_bytes: usize,
}

impl Default for TcpTransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            io_timeout: Duration::from_secs(3),
            max_response_bytes: 4096,
        }
    }
}

/// One TCP connection per packet.
#[derive(Debug, Clone, Default)]
pub struct TcpTransport {
    config: TcpTransportConfig,
}

impl TcpTransport {
    pub fn new(config: TcpTransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send_packet(
        &self,
        endpoint: &Endpoint,
        packet: &[u8],
        await_response: bool,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
        let stream = match time::timeout(self.config.connect_timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(TransportError::ConnectFailed {
                    endpoint: endpoint.clone(),
                    source,
                })
            }
            Err(_) => {
                return Err(TransportError::Timeout {
                    stage: "connect",
                    after: self.config.connect_timeout,
                })
            }
        };
        debug!("connected to {endpoint}");

        exchange_then_close(stream, packet, await_response, &self.config).await
    }
}

/// Runs the write/read exchange on `stream` and then shuts it down once.
pub(crate) async fn exchange_then_close<S>(
    mut stream: S,
    packet: &[u8],
    await_response: bool,
    config: &TcpTransportConfig,
) -> Result<Option<Vec<u8>>, TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let result = exchange(&mut stream, packet, await_response, config).await;
    close(&mut stream).await;
    result
}

async fn exchange<S>(
    stream: &mut S,
    packet: &[u8],
    await_response: bool,
    config: &TcpTransportConfig,
) -> Result<Option<Vec<u8>>, TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    with_deadline("write", config.io_timeout, async {
        stream.write_all(packet).await?;
        stream.flush().await?;
        Ok::<(), std::io::Error>(())
    })
    .await?;
    debug!("wrote {} bytes", packet.len());

    if !await_response {
        return Ok(None);
    }

    let response = read_response(stream, config).await?;
    debug!("read {} response bytes", response.len());
    Ok(Some(response))
}

/// Reads until EOF or until the I/O deadline passes.
///
/// A deadline that passes after some bytes arrived counts as "drained": the
/// bytes read so far are the response.  Only a deadline with nothing read is
/// a timeout.
async fn read_response<S>(
    stream: &mut S,
    config: &TcpTransportConfig,
) -> Result<Vec<u8>, TransportError>
where
    S: AsyncRead + Unpin,
{
    let limit = config.max_response_bytes;
    let deadline = time::Instant::now() + config.io_timeout;
    let mut response = Vec::new();
    let mut chunk = [0u8; 512];

    loop {
        match time::timeout_at(deadline, stream.read(&mut chunk)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => {
                response.extend_from_slice(&chunk[..n]);
                if response.len() > limit {
                    return Err(TransportError::ResponseTooLarge { limit });
                }
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) if response.is_empty() => {
                return Err(TransportError::Timeout {
                    stage: "read",
                    after: config.io_timeout,
                })
            }
            Err(_) => {
                debug!(
                    "peer kept the connection open; using {} bytes read before the deadline",
                    response.len()
                );
                break;
            }
        }
    }

    Ok(response)
}

async fn with_deadline<T, F>(
    stage: &'static str,
    after: Duration,
    fut: F,
) -> Result<T, TransportError>
where
    F: Future<Output = std::io::Result<T>>,
{
    match time::timeout(after, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(TransportError::Timeout { stage, after }),
    }
}

async fn close<S: AsyncWrite + Unpin>(stream: &mut S) {
    if let Err(e) = stream.shutdown().await {
        debug!("shutdown failed: {e}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
