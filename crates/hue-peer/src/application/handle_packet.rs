//! ColorDevice: the peer's packet handling use case.
//!
//! Every inbound packet goes through the same steps, in this order:
//!
//! 1. **Decode** – the version byte selects push or request and fixes the
//!    exact length.
//! 2. **Verify** – recompute the HMAC tag with the shared secret.  Nothing
//!    from an unverified packet is trusted, including its nonce.
//! 3. **Replay check** – the timestamp must be fresh and the nonce unseen.
//! 4. **Apply** – a push replaces the current color; a request produces a
//!    [`ColorReport`] bound to the request's nonce.
//!
//! A packet rejected at any step leaves the device unchanged.

use std::time::Duration;

use hue_core::{
    protocol::replay::{ReplayError, ReplayGuard},
    Color, ColorReport, Packet, ProtocolError, SharedSecret,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::config::PeerConfig;

/// Why a packet was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeerError {
    /// The packet did not decode or its tag did not verify.
    #[error("invalid packet: {0}")]
    Protocol(#[from] ProtocolError),

    /// The packet verified but is stale or a replay.
    #[error("replay rejected: {0}")]
    Replay(#[from] ReplayError),
}

/// What the connection handler should do after a packet was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerReply {
    /// A push was applied; nothing is sent back.
    Stored(Color),
    /// A request was answered; write these bytes back to the client.
    Report(Vec<u8>),
}

/// The current color plus everything needed to authenticate packets.
#[derive(Debug)]
pub struct ColorDevice {
    color: Color,
    secret: SharedSecret,
    replay: ReplayGuard,
}

impl ColorDevice {
    pub fn new(secret: SharedSecret, initial_color: Color, freshness_window: Duration) -> Self {
        Self {
            color: initial_color,
            secret,
            replay: ReplayGuard::new(freshness_window),
        }
    }

    pub fn from_config(config: &PeerConfig) -> Self {
        Self::new(
            config.secret.clone(),
            config.initial_color,
            config.freshness_window,
        )
    }

    /// The color currently on display.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Handles one complete packet received at Unix time `now`.
    ///
    /// # Errors
    ///
    /// - [`PeerError::Protocol`] if the packet is malformed or its tag does
    ///   not verify.
    /// - [`PeerError::Replay`] if it is stale or its nonce was already used.
    pub fn handle_packet(&mut self, bytes: &[u8], now: i64) -> Result<PeerReply, PeerError> {
        let packet = Packet::decode(bytes)?;
        packet.verify(&self.secret)?;
        self.replay.check(packet.header(), now)?;

        match packet {
            Packet::Push { color, .. } => {
                info!("color changed {} -> {color}", self.color);
                self.color = color;
                Ok(PeerReply::Stored(color))
            }
            Packet::Request { header, .. } => {
                let report = ColorReport {
                    timestamp: now,
                    color: self.color,
                };
                debug!("reporting {} for nonce {:#018x}", self.color, header.nonce);
                Ok(PeerReply::Report(report.encode(&self.secret, header.nonce)?))
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use hue_core::protocol::header::Header;

    const NOW: i64 = 1_700_000_000;

    fn secret() -> SharedSecret {
        SharedSecret::new("SHARED_SECRET")
    }

    fn device() -> ColorDevice {
        ColorDevice::new(secret(), Color::BLACK, Duration::from_secs(30))
    }

    fn push_bytes(color: Color, nonce: u64, timestamp: i64) -> Vec<u8> {
        Packet::push_with_header(Header::new(timestamp, nonce), color, &secret())
            .unwrap()
            .encode()
    }

    fn request_bytes(nonce: u64, timestamp: i64) -> Vec<u8> {
        Packet::request_with_header(Header::new(timestamp, nonce), &secret())
            .unwrap()
            .encode()
    }

    #[test]
    fn test_push_updates_color() {
        // Arrange
        let mut device = device();
        let red = Color::new(255, 0, 0);

        // Act
        let reply = device.handle_packet(&push_bytes(red, 1, NOW), NOW);

        // Assert
        assert_eq!(reply, Ok(PeerReply::Stored(red)));
        assert_eq!(device.color(), red);
    }

    #[test]
    fn test_request_reports_current_color_bound_to_nonce() {
        // Arrange
        let mut device = device();
        device
            .handle_packet(&push_bytes(Color::new(1, 2, 3), 1, NOW), NOW)
            .unwrap();

        // Act
        let reply = device.handle_packet(&request_bytes(42, NOW), NOW).unwrap();

        // Assert
        let PeerReply::Report(bytes) = reply else {
            panic!("expected a report, got {reply:?}");
        };
        let report = ColorReport::verify(&bytes, &secret(), 42).expect("report verifies");
        assert_eq!(report.color, Color::new(1, 2, 3));
        assert_eq!(report.timestamp, NOW);
        assert!(ColorReport::verify(&bytes, &secret(), 43).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected_and_color_kept() {
        let mut device = device();
        let forged = Packet::push_with_header(
            Header::new(NOW, 1),
            Color::new(9, 9, 9),
            &SharedSecret::new("guess"),
        )
        .unwrap()
        .encode();

        let result = device.handle_packet(&forged, NOW);

        assert!(matches!(result, Err(PeerError::Protocol(ProtocolError::Auth(_)))));
        assert_eq!(device.color(), Color::BLACK);
    }

    #[test]
    fn test_replayed_push_is_rejected() {
        // Arrange
        let mut device = device();
        let packet = push_bytes(Color::new(10, 20, 30), 7, NOW);
        device.handle_packet(&packet, NOW).unwrap();
        device
            .handle_packet(&push_bytes(Color::new(40, 50, 60), 8, NOW), NOW)
            .unwrap();

        // Act: replay the first push
        let result = device.handle_packet(&packet, NOW + 1);

        // Assert
        assert_eq!(
            result,
            Err(PeerError::Replay(ReplayError::Duplicate { nonce: 7 }))
        );
        assert_eq!(device.color(), Color::new(40, 50, 60));
    }

    #[test]
    fn test_stale_request_is_rejected() {
        let mut device = device();

        let result = device.handle_packet(&request_bytes(1, NOW - 31), NOW);

        assert!(matches!(result, Err(PeerError::Replay(ReplayError::Stale { .. }))));
    }

    #[test]
    fn test_truncated_packet_is_rejected() {
        let mut device = device();
        let packet = push_bytes(Color::new(1, 1, 1), 1, NOW);

        let result = device.handle_packet(&packet[..40], NOW);

        assert!(matches!(result, Err(PeerError::Protocol(_))));
    }

    #[test]
    fn test_forged_packet_does_not_burn_nonce() {
        // Arrange: a forged packet reusing nonce 5 must not block the real one
        let mut device = device();
        let forged = Packet::push_with_header(
            Header::new(NOW, 5),
            Color::new(0, 0, 1),
            &SharedSecret::new("guess"),
        )
        .unwrap()
        .encode();
        let _ = device.handle_packet(&forged, NOW);

        // Act
        let result = device.handle_packet(&push_bytes(Color::new(0, 0, 2), 5, NOW), NOW);

        // Assert
        assert!(result.is_ok());
    }

    #[test]
    fn test_from_config_uses_initial_color() {
        let config = PeerConfig {
            initial_color: Color::new(0x12, 0x34, 0x56),
            ..PeerConfig::default()
        };

        assert_eq!(ColorDevice::from_config(&config).color(), Color::new(0x12, 0x34, 0x56));
    }
}
