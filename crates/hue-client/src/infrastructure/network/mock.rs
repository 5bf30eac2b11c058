//! Recording fake transport for tests.
//!
//! # Why a fake transport?
//!
//! The real [`super::TcpTransport`] needs a listening peer.  For tests that
//! only care about *what* the client would have sent, `RecordingTransport`
//! stores every call in a `Mutex<Vec<...>>` and answers with a scripted reply.
//!
//! # Usage in tests
//!
//! ```ignore
//! let transport = Arc::new(RecordingTransport::replying(vec![0; 11]));
//! let client = ColorExchangeClient::new(transport.clone(), settings);
//!
//! client.push_color(Color::new(255, 0, 0)).await;
//!
//! let sent = transport.sent.lock().unwrap();
//! assert_eq!(sent[0].packet.len(), 52);
//! ```
//!
//! # `should_fail` flag
//!
//! Set `should_fail = true` to make every call return
//! `TransportError::Io(ConnectionRefused)` without recording it.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::transport::{Endpoint, Transport, TransportError};

/// One call made to [`RecordingTransport::send_packet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPacket {
    pub endpoint: Endpoint,
    pub packet: Vec<u8>,
    pub await_response: bool,
}

/// A transport that records calls instead of opening sockets.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    /// Every successful call, in order.
    pub sent: Mutex<Vec<SentPacket>>,
    /// Bytes returned when a call asks for a response.
    pub reply: Vec<u8>,
    /// When `true`, every call fails.
    pub should_fail: bool,
}

impl RecordingTransport {
    /// Creates a transport that answers requests with `reply`.
    pub fn replying(reply: Vec<u8>) -> Self {
        Self {
            reply,
            ..Self::default()
        }
    }

    /// Creates a transport whose calls all fail.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Returns a copy of the recorded calls.
    pub fn sent_packets(&self) -> Vec<SentPacket> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_packet(
        &self,
        endpoint: &Endpoint,
        packet: &[u8],
        await_response: bool,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        if self.should_fail {
            return Err(TransportError::Io(std::io::Error::from(
                std::io::ErrorKind::ConnectionRefused,
            )));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentPacket {
                endpoint: endpoint.clone(),
                packet: packet.to_vec(),
                await_response,
            });
        }
        Ok(await_response.then(|| self.reply.clone()))
    }
}
