//! The transport port used by the color exchange use case.
//!
//! The application layer only needs one capability from the network: "send
//! these bytes to that endpoint, and maybe give me back whatever the peer
//! answers".  Keeping it behind a trait lets tests swap the TCP
//! implementation for a fake that records what would have been sent.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Host and port of a peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Hostname or IP address.
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Errors that can occur while exchanging a packet with a peer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The TCP connection could not be established.
    #[error("failed to connect to {endpoint}: {source}")]
    ConnectFailed {
        endpoint: Endpoint,
        #[source]
        source: std::io::Error,
    },

    /// A step did not finish within its deadline.
    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: &'static str, after: Duration },

    /// An I/O error occurred on the established connection.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer sent more bytes than the configured limit.
    #[error("response exceeds {limit} bytes")]
    ResponseTooLarge { limit: usize },
}

/// Sends one packet over a fresh connection.
///
/// Implementations must close the connection on every exit path, whether or
/// not a response was requested and whether or not an error occurred.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connects to `endpoint`, writes `packet` fully and flushes.
    ///
    /// When `await_response` is `false`, returns `Ok(None)` right after the
    /// write.  When `true`, reads until the peer closes the connection and
    /// returns the accumulated bytes (possibly empty).
    async fn send_packet(
        &self,
        endpoint: &Endpoint,
        packet: &[u8],
        await_response: bool,
    ) -> Result<Option<Vec<u8>>, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_display_is_host_colon_port() {
        assert_eq!(Endpoint::new("192.168.0.4", 3384).to_string(), "192.168.0.4:3384");
    }

    #[test]
    fn test_connect_error_message_names_endpoint() {
        let err = TransportError::ConnectFailed {
            endpoint: Endpoint::new("peer.local", 1),
            source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        };
        assert!(err.to_string().contains("peer.local:1"));
    }
}
