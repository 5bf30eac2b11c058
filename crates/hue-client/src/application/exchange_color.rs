//! ColorExchangeClient: the two operations the UI calls.
//!
//! - [`ColorExchangeClient::send_color`] pushes a color and does not wait for
//!   an answer.  It runs on the Tokio runtime and hands back a
//!   [`JoinHandle`], so the UI thread never blocks and tests can still await
//!   completion deterministically.
//! - [`ColorExchangeClient::request_color`] asks the peer for its current
//!   color and reads it from the reply.
//!
//! Neither operation surfaces an error to the caller.  Failures are logged
//! and reported as outcome variants, so a caller can tell "the network
//! failed" apart from "the peer answered with something unusable".  Nothing
//! is retried.

use std::sync::Arc;

use hue_core::{
    protocol::response::MIN_COLOR_RESPONSE_LEN, decode_response_color, Color, ColorReport,
    Packet, SharedSecret,
};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::application::transport::{Endpoint, Transport};

/// Where to send one kind of packet and which secret to tag it with.
#[derive(Debug, Clone)]
pub struct Target {
    pub endpoint: Endpoint,
    pub secret: SharedSecret,
}

/// Settings for both exchange directions.
///
/// Push and pull are configured separately because deployed devices have used
/// different hosts and secrets for each.
#[derive(Debug, Clone)]
pub struct ExchangeSettings {
    /// Destination of push packets.
    pub push: Target,
    /// Destination of request packets.
    pub pull: Target,
    /// When `true`, a reply must be a [`ColorReport`] whose tag verifies for
    /// the request nonce; otherwise the color is read at fixed offsets without
    /// any check.
    pub verify_responses: bool,
}

/// Result of a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The packet was written and flushed.  There is no delivery receipt.
    Sent { bytes_written: usize },
    /// The packet could not be built (the MAC could not be keyed).
    EncodeFailed,
    /// Connect or write failed.
    TransportFailed,
}

/// Result of a color request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// The reply carried a color.
    Received(Color),
    /// The reply was shorter than 11 bytes.  `partial` holds the channels that
    /// were present, with missing ones set to `0`.
    ShortResponse { len: usize, partial: Color },
    /// Reply verification was enabled and the reply did not verify.
    Unauthenticated,
    /// The request packet could not be built.
    EncodeFailed,
    /// Connect, write, or read failed.
    TransportFailed,
}

impl PullOutcome {
    /// The received color, if there is one.
    pub fn color(&self) -> Option<Color> {
        match self {
            PullOutcome::Received(color) => Some(*color),
            _ => None,
        }
    }
}

/// Pushes colors to, and requests colors from, the configured peer.
///
/// Cloning is cheap: the transport and settings are shared behind `Arc`s.
#[derive(Clone)]
pub struct ColorExchangeClient {
    transport: Arc<dyn Transport>,
    settings: Arc<ExchangeSettings>,
}

impl ColorExchangeClient {
    pub fn new(transport: Arc<dyn Transport>, settings: ExchangeSettings) -> Self {
        Self {
            transport,
            settings: Arc::new(settings),
        }
    }

    /// Pushes `color` in the background.
    ///
    /// Must be called from within a Tokio runtime.  Dropping the handle does
    /// not cancel the push.
    pub fn send_color(&self, color: Color) -> JoinHandle<PushOutcome> {
        let this = self.clone();
        tokio::spawn(async move { this.push_color(color).await })
    }

    /// Builds a push packet for `color` and writes it without awaiting a reply.
    pub async fn push_color(&self, color: Color) -> PushOutcome {
        let target = &self.settings.push;

        let packet = match Packet::push(color, &target.secret) {
            Ok(packet) => packet,
            Err(e) => {
                error!("failed to build push packet: {e}");
                return PushOutcome::EncodeFailed;
            }
        };
        let bytes = packet.encode();

        match self.transport.send_packet(&target.endpoint, &bytes, false).await {
            Ok(_) => {
                info!("pushed {color} to {}", target.endpoint);
                PushOutcome::Sent {
                    bytes_written: bytes.len(),
                }
            }
            Err(e) => {
                error!("push to {} failed: {e}", target.endpoint);
                PushOutcome::TransportFailed
            }
        }
    }

    /// Runs [`Self::request_color`] in the background.
    pub fn spawn_request(&self) -> JoinHandle<PullOutcome> {
        let this = self.clone();
        tokio::spawn(async move { this.request_color().await })
    }

    /// Sends a request packet and extracts the color from the reply.
    pub async fn request_color(&self) -> PullOutcome {
        let target = &self.settings.pull;

        let packet = match Packet::request(&target.secret) {
            Ok(packet) => packet,
            Err(e) => {
                error!("failed to build request packet: {e}");
                return PullOutcome::EncodeFailed;
            }
        };
        let nonce = packet.header().nonce;

        let response = match self
            .transport
            .send_packet(&target.endpoint, &packet.encode(), true)
            .await
        {
            Ok(response) => response.unwrap_or_default(),
            Err(e) => {
                error!("color request to {} failed: {e}", target.endpoint);
                return PullOutcome::TransportFailed;
            }
        };

        let outcome = interpret_response(
            &response,
            &target.secret,
            nonce,
            self.settings.verify_responses,
        );
        match outcome {
            PullOutcome::Received(color) => info!("received {color} from {}", target.endpoint),
            PullOutcome::ShortResponse { len, .. } => {
                warn!("response from {} too short: {len} bytes", target.endpoint)
            }
            _ => {}
        }
        outcome
    }
}

/// Turns the raw reply to the request with `request_nonce` into an outcome.
pub fn interpret_response(
    response: &[u8],
    secret: &SharedSecret,
    request_nonce: u64,
    verify: bool,
) -> PullOutcome {
    if response.len() < MIN_COLOR_RESPONSE_LEN {
        return PullOutcome::ShortResponse {
            len: response.len(),
            partial: decode_response_color(response),
        };
    }

    if !verify {
        return PullOutcome::Received(decode_response_color(response));
    }

    match ColorReport::verify(response, secret, request_nonce) {
        Ok(report) => {
            debug!("response verified (peer timestamp {})", report.timestamp);
            PullOutcome::Received(report.color)
        }
        Err(e) => {
            warn!("rejecting unverified response: {e}");
            PullOutcome::Unauthenticated
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::transport::{MockTransport, TransportError};
    use std::sync::Mutex;

    fn settings(verify_responses: bool) -> ExchangeSettings {
        ExchangeSettings {
            push: Target {
                endpoint: Endpoint::new("push.local", 3384),
                secret: SharedSecret::new("PUSH_SECRET"),
            },
            pull: Target {
                endpoint: Endpoint::new("pull.local", 3385),
                secret: SharedSecret::new("PULL_SECRET"),
            },
            verify_responses,
        }
    }

    fn client(mock: MockTransport, verify: bool) -> ColorExchangeClient {
        ColorExchangeClient::new(Arc::new(mock), settings(verify))
    }

    // ── Push ─────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_send_color_pure_red_writes_52_byte_push_packet() {
        // Arrange
        let captured = Arc::new(Mutex::new((String::new(), Vec::new(), true)));
        let sink = Arc::clone(&captured);
        let mut mock = MockTransport::new();
        mock.expect_send_packet()
            .times(1)
            .returning(move |endpoint, packet, await_response| {
                *sink.lock().unwrap() = (endpoint.to_string(), packet.to_vec(), await_response);
                Ok(None)
            });

        // Act
        let outcome = client(mock, false)
            .send_color(Color::from_unit(1.0, 0.0, 0.0))
            .await
            .expect("task must not panic");

        // Assert
        assert_eq!(outcome, PushOutcome::Sent { bytes_written: 52 });
        let (endpoint, bytes, await_response) = captured.lock().unwrap().clone();
        assert_eq!(endpoint, "push.local:3384");
        assert!(!await_response, "push must not wait for a reply");
        assert_eq!(bytes.len(), 52);
        assert_eq!(&bytes[49..], &[0xFF, 0x00, 0x00]);
        let decoded = Packet::decode(&bytes).unwrap();
        assert_eq!(decoded.verify(&SharedSecret::new("PUSH_SECRET")), Ok(()));
    }

    #[tokio::test]
    async fn test_push_transport_failure_is_reported_not_raised() {
        let mut mock = MockTransport::new();
        mock.expect_send_packet().times(1).returning(|_, _, _| {
            Err(TransportError::Io(std::io::Error::from(
                std::io::ErrorKind::BrokenPipe,
            )))
        });

        let outcome = client(mock, false).push_color(Color::BLACK).await;

        assert_eq!(outcome, PushOutcome::TransportFailed);
    }

    // ── Request ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_request_color_reads_fixed_offsets() {
        // Arrange: an opaque reply with the color at bytes 8..11
        let mut mock = MockTransport::new();
        mock.expect_send_packet()
            .times(1)
            .returning(|endpoint, packet, await_response| {
                assert_eq!(endpoint.port, 3385);
                assert_eq!(packet.len(), 50);
                assert!(await_response);
                let mut reply = vec![0u8; 8];
                reply.extend_from_slice(&[0x11, 0x22, 0x33]);
                Ok(Some(reply))
            });

        // Act
        let outcome = client(mock, false).request_color().await;

        // Assert
        assert_eq!(outcome, PullOutcome::Received(Color::new(0x11, 0x22, 0x33)));
        assert_eq!(outcome.color(), Some(Color::new(0x11, 0x22, 0x33)));
    }

    #[tokio::test]
    async fn test_request_color_short_reply_is_distinct_from_black() {
        let mut mock = MockTransport::new();
        mock.expect_send_packet()
            .returning(|_, _, _| Ok(Some(vec![1, 2, 3, 4, 5])));

        let outcome = client(mock, false).request_color().await;

        assert_eq!(
            outcome,
            PullOutcome::ShortResponse {
                len: 5,
                partial: Color::BLACK
            }
        );
        assert_eq!(outcome.color(), None);
    }

    #[tokio::test]
    async fn test_request_color_empty_reply_is_short() {
        let mut mock = MockTransport::new();
        mock.expect_send_packet().returning(|_, _, _| Ok(Some(Vec::new())));

        let outcome = client(mock, false).request_color().await;

        assert!(matches!(outcome, PullOutcome::ShortResponse { len: 0, .. }));
    }

    #[tokio::test]
    async fn test_request_color_transport_failure() {
        let mut mock = MockTransport::new();
        mock.expect_send_packet().returning(|_, _, _| {
            Err(TransportError::Timeout {
                stage: "read",
                after: std::time::Duration::from_secs(3),
            })
        });

        let outcome = client(mock, false).spawn_request().await.unwrap();

        assert_eq!(outcome, PullOutcome::TransportFailed);
    }

    #[tokio::test]
    async fn test_verified_request_accepts_report_for_this_nonce() {
        // Arrange: the fake peer answers with a report bound to the request nonce
        let mut mock = MockTransport::new();
        mock.expect_send_packet().returning(|_, packet, _| {
            let request = Packet::decode(packet).expect("request decodes");
            let secret = SharedSecret::new("PULL_SECRET");
            request.verify(&secret).expect("request verifies with pull secret");
            let reply = ColorReport::now(Color::new(5, 6, 7))
                .encode(&secret, request.header().nonce)
                .unwrap();
            Ok(Some(reply))
        });

        // Act
        let outcome = client(mock, true).request_color().await;

        // Assert
        assert_eq!(outcome, PullOutcome::Received(Color::new(5, 6, 7)));
    }

    #[tokio::test]
    async fn test_verified_request_rejects_blind_reply() {
        let mut mock = MockTransport::new();
        mock.expect_send_packet()
            .returning(|_, _, _| Ok(Some(vec![0xAA; 43])));

        let outcome = client(mock, true).request_color().await;

        assert_eq!(outcome, PullOutcome::Unauthenticated);
    }

    // ── interpret_response ───────────────────────────────────────────────────

    #[test]
    fn test_interpret_response_ignores_trailing_bytes_when_unverified() {
        let mut reply = vec![0u8; 8];
        reply.extend_from_slice(&[9, 9, 9]);
        reply.extend_from_slice(&[0xFF; 100]);

        let outcome = interpret_response(&reply, &SharedSecret::new("s"), 0, false);

        assert_eq!(outcome, PullOutcome::Received(Color::new(9, 9, 9)));
    }
}
