//! TCP listener: accept loop and per-connection packet framing.
//!
//! Clients open one connection per packet, so a connection is handled as:
//!
//! 1. Read the 17-byte prefix every header shares.
//! 2. Look at the version byte (offset 16) to learn the full packet length,
//!    then read exactly the remaining bytes.
//! 3. Hand the packet to the shared [`ColorDevice`].
//! 4. For a request, write the [`hue_core::ColorReport`] back.
//! 5. Shut the stream down.
//!
//! Reading (steps 1 and 2) is bounded by `read_timeout`, so a client that
//! connects and goes quiet cannot hold a task forever.  Rejected packets are
//! logged and the connection is closed without a reply.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use hue_core::protocol::{
    header::{unix_now_secs, HEADER_PREFIX_SIZE},
    packet::{wire_len_for_version, VERSION_OFFSET},
    HexBytes,
};
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::Mutex,
    time::timeout,
};
use tracing::{debug, error, info, warn};

use crate::application::handle_packet::{ColorDevice, PeerReply};
use crate::domain::config::PeerConfig;

/// How often the accept loop re-checks the `running` flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Errors from the listener and from reading a single connection.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The TCP listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred on a connection.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The packet was not fully received within the read timeout.
    #[error("read timed out after {0:?}")]
    ReadTimeout(Duration),

    /// The version byte names no known packet kind.
    #[error("unknown packet version {0}")]
    UnknownVersion(u8),
}

/// A bound listener plus the device it serves.
pub struct PeerServer {
    listener: TcpListener,
    device: Arc<Mutex<ColorDevice>>,
    read_timeout: Duration,
}

impl PeerServer {
    /// Binds the listener on `config.bind_addr`.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Bind`] if the address is in use or the process
    /// lacks permission to bind it.
    pub async fn bind(config: &PeerConfig) -> Result<Self, ListenerError> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|source| ListenerError::Bind {
                addr: config.bind_addr,
                source,
            })?;

        Ok(Self {
            listener,
            device: Arc::new(Mutex::new(ColorDevice::from_config(config))),
            read_timeout: config.read_timeout,
        })
    }

    /// The address actually bound (useful when binding port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, ListenerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared handle to the device, e.g. to read the current color.
    pub fn device(&self) -> Arc<Mutex<ColorDevice>> {
        Arc::clone(&self.device)
    }

    /// Accepts connections until `running` is set to `false`.
    ///
    /// Each connection is handled on its own task.  Accept errors are logged
    /// and the loop continues.
    pub async fn serve(self, running: Arc<AtomicBool>) -> Result<(), ListenerError> {
        info!("peer listening on {}", self.local_addr()?);

        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown flag set; stopping accept loop");
                break;
            }

            match timeout(ACCEPT_POLL_INTERVAL, self.listener.accept()).await {
                Ok(Ok((stream, peer_addr))) => {
                    debug!("connection from {peer_addr}");
                    let device = Arc::clone(&self.device);
                    let read_timeout = self.read_timeout;
                    tokio::spawn(async move {
                        handle_tcp_connection(stream, peer_addr, device, read_timeout).await;
                    });
                }
                Ok(Err(e)) => error!("accept error: {e}"),
                Err(_) => {}
            }
        }

        Ok(())
    }
}

async fn handle_tcp_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    device: Arc<Mutex<ColorDevice>>,
    read_timeout: Duration,
) {
    if let Err(e) = handle_connection(stream, &device, read_timeout).await {
        warn!("connection from {peer_addr}: {e}");
    }
}

/// Reads one packet from `stream`, applies it, replies, and shuts down.
///
/// Returns `Ok(())` for a rejected packet as well; the rejection is logged
/// here and the client only sees the connection close.
pub(crate) async fn handle_connection<S>(
    mut stream: S,
    device: &Mutex<ColorDevice>,
    read_timeout: Duration,
) -> Result<(), ListenerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let result = respond(&mut stream, device, read_timeout).await;
    if let Err(e) = stream.shutdown().await {
        debug!("shutdown failed: {e}");
    }
    result
}

async fn respond<S>(
    stream: &mut S,
    device: &Mutex<ColorDevice>,
    read_timeout: Duration,
) -> Result<(), ListenerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let packet = timeout(read_timeout, read_packet(stream))
        .await
        .map_err(|_| ListenerError::ReadTimeout(read_timeout))??;
    debug!("received {}", HexBytes(&packet));

    // The lock is held for one packet only, never across socket I/O.
    let reply = device.lock().await.handle_packet(&packet, unix_now_secs());

    match reply {
        Ok(PeerReply::Stored(color)) => info!("stored {color}"),
        Ok(PeerReply::Report(report)) => {
            stream.write_all(&report).await?;
            stream.flush().await?;
        }
        Err(e) => warn!("rejected packet: {e}"),
    }
    Ok(())
}

/// Reads exactly one packet, sized by its version byte.
async fn read_packet<S: AsyncRead + Unpin>(stream: &mut S) -> Result<Vec<u8>, ListenerError> {
    let mut buf = vec![0u8; HEADER_PREFIX_SIZE];
    stream.read_exact(&mut buf).await?;

    let version = buf[VERSION_OFFSET];
    let total = wire_len_for_version(version).ok_or(ListenerError::UnknownVersion(version))?;

    buf.resize(total, 0);
    stream.read_exact(&mut buf[HEADER_PREFIX_SIZE..]).await?;
    Ok(buf)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
