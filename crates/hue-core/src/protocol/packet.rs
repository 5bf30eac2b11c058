//! Packet codec for the two packet kinds.
//!
//! Wire format:
//! ```text
//! push:    [ts:8][nonce:8][ver=1:1][tag:32][r:1][g:1][b:1]     = 52 bytes
//! request: [ts:8][nonce:8][ver=3:1][flag=1:1][tag:32]          = 50 bytes
//! ```
//!
//! # Tag coverage differs per kind
//!
//! | kind    | tag input            |
//! |---------|----------------------|
//! | push    | header ∥ payload     |
//! | request | header               |
//!
//! The tag sits *between* the header and the payload on the wire, but for a
//! push packet it is computed as if the payload directly followed the header.
//! The two kinds are therefore not interchangeable: a push tag never verifies
//! over the header alone.

use thiserror::Error;
use tracing::debug;

use crate::domain::color::Color;
use crate::protocol::auth::{compute_tag_over, verify_tag, AuthError, SharedSecret, Tag, TAG_SIZE};
use crate::protocol::header::{decode_header, encode_header, Header, PacketKind, HEADER_PREFIX_SIZE};
use crate::protocol::hex::HexBytes;

/// Errors that can occur during packet encoding, decoding, or verification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the minimum required length.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The version byte is neither push (1) nor request (3).
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// A header field has an invalid value.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// More bytes were supplied than the packet kind allows.
    #[error("trailing data: expected {expected} bytes, got {available}")]
    TrailingData { expected: usize, available: usize },

    /// Tag computation or verification failed.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
}

/// A decoded or freshly built packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet {
    /// Sends `color` to the peer.
    Push { header: Header, tag: Tag, color: Color },
    /// Asks the peer for its current color.
    Request { header: Header, tag: Tag },
}

impl Packet {
    /// Builds a push packet for `color` with a fresh header.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Auth`] if the tag cannot be computed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hue_core::{Color, Packet, SharedSecret};
    ///
    /// let secret = SharedSecret::new("SHARED_SECRET");
    /// let bytes = Packet::push(Color::new(0xFF, 0, 0), &secret).unwrap().encode();
    /// assert_eq!(bytes.len(), 52);
    /// assert_eq!(&bytes[49..], &[0xFF, 0x00, 0x00]);
    /// ```
    pub fn push(color: Color, secret: &SharedSecret) -> Result<Self, ProtocolError> {
        Self::push_with_header(Header::now(), color, secret)
    }

    /// Builds a push packet with an explicit header.
    pub fn push_with_header(
        header: Header,
        color: Color,
        secret: &SharedSecret,
    ) -> Result<Self, ProtocolError> {
        let header_bytes = encode_header(&header, PacketKind::Push);
        let tag = compute_tag_over(secret, &[header_bytes.as_slice(), &color.to_payload()[..]])?;
        Ok(Packet::Push { header, tag, color })
    }

    /// Builds a request packet with a fresh header.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Auth`] if the tag cannot be computed.
    pub fn request(secret: &SharedSecret) -> Result<Self, ProtocolError> {
        Self::request_with_header(Header::now(), secret)
    }

    /// Builds a request packet with an explicit header.
    pub fn request_with_header(header: Header, secret: &SharedSecret) -> Result<Self, ProtocolError> {
        let header_bytes = encode_header(&header, PacketKind::Request);
        let tag = compute_tag_over(secret, &[header_bytes.as_slice()])?;
        Ok(Packet::Request { header, tag })
    }

    pub fn kind(&self) -> PacketKind {
        match self {
            Packet::Push { .. } => PacketKind::Push,
            Packet::Request { .. } => PacketKind::Request,
        }
    }

    pub fn header(&self) -> &Header {
        match self {
            Packet::Push { header, .. } | Packet::Request { header, .. } => header,
        }
    }

    pub fn tag(&self) -> &Tag {
        match self {
            Packet::Push { tag, .. } | Packet::Request { tag, .. } => tag,
        }
    }

    /// The pushed color, or `None` for a request.
    pub fn color(&self) -> Option<Color> {
        match self {
            Packet::Push { color, .. } => Some(*color),
            Packet::Request { .. } => None,
        }
    }

    /// Serializes the packet to its wire form `header ∥ tag ∥ payload?`.
    pub fn encode(&self) -> Vec<u8> {
        let kind = self.kind();
        let mut buf = Vec::with_capacity(kind.wire_len());
        buf.extend_from_slice(&encode_header(self.header(), kind));
        buf.extend_from_slice(self.tag().as_bytes());
        if let Packet::Push { color, .. } = self {
            buf.extend_from_slice(&color.to_payload());
        }
        debug!("encoded {kind:?} packet: {}", HexBytes(&buf));
        buf
    }

    /// Parses a packet **without** checking its tag.
    ///
    /// Call [`Packet::verify`] before trusting any field.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the header is malformed or `bytes` is not
    /// exactly the wire length of its kind.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let (header, kind) = decode_header(bytes)?;
        let expected = kind.wire_len();
        if bytes.len() < expected {
            return Err(ProtocolError::InsufficientData {
                needed: expected,
                available: bytes.len(),
            });
        }
        if bytes.len() > expected {
            return Err(ProtocolError::TrailingData {
                expected,
                available: bytes.len(),
            });
        }

        let tag_start = kind.header_len();
        let tag = Tag::from_slice(&bytes[tag_start..]).ok_or(ProtocolError::InsufficientData {
            needed: tag_start + TAG_SIZE,
            available: bytes.len(),
        })?;

        Ok(match kind {
            PacketKind::Push => {
                let p = tag_start + TAG_SIZE;
                Packet::Push {
                    header,
                    tag,
                    color: Color::new(bytes[p], bytes[p + 1], bytes[p + 2]),
                }
            }
            PacketKind::Request => Packet::Request { header, tag },
        })
    }

    /// Recomputes the tag over this kind's coverage and compares it with the
    /// carried tag in constant time.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Auth`] with [`AuthError::TagMismatch`] when
    /// the packet was not produced with `secret`.
    pub fn verify(&self, secret: &SharedSecret) -> Result<(), ProtocolError> {
        let header_bytes = encode_header(self.header(), self.kind());
        match self {
            Packet::Push { tag, color, .. } => {
                verify_tag(secret, &[header_bytes.as_slice(), &color.to_payload()[..]], tag)?
            }
            Packet::Request { tag, .. } => verify_tag(secret, &[header_bytes.as_slice()], tag)?,
        }
        Ok(())
    }
}

/// Returns the full wire length for a version byte, or `None` if unknown.
///
/// A stream reader reads the 17-byte common prefix, looks at byte 16, and
/// then knows how many more bytes belong to the packet.
pub fn wire_len_for_version(version: u8) -> Option<usize> {
    PacketKind::from_version(version).map(PacketKind::wire_len)
}

/// Offset of the version byte inside every header.
pub const VERSION_OFFSET: usize = HEADER_PREFIX_SIZE - 1;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::auth::compute_tag;

    fn secret() -> SharedSecret {
        SharedSecret::new("SHARED_SECRET")
    }

    fn fixed_header() -> Header {
        Header::new(1_700_000_000, 0x0123_4567_89AB_CDEF)
    }

    // ── Push ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_push_packet_layout() {
        // Arrange
        let color = Color::new(0x10, 0x20, 0x30);

        // Act
        let bytes = Packet::push_with_header(fixed_header(), color, &secret())
            .unwrap()
            .encode();

        // Assert
        assert_eq!(bytes.len(), 52);
        assert_eq!(&bytes[0..8], &1_700_000_000i64.to_be_bytes());
        assert_eq!(&bytes[8..16], &0x0123_4567_89AB_CDEFu64.to_be_bytes());
        assert_eq!(bytes[16], 1);
        assert_eq!(&bytes[49..52], &[0x10, 0x20, 0x30]);
    }

    #[test]
    fn test_pure_red_push_ends_with_ff_00_00() {
        let bytes = Packet::push(Color::from_unit(1.0, 0.0, 0.0), &secret())
            .unwrap()
            .encode();
        assert_eq!(bytes.len(), 52);
        assert_eq!(&bytes[bytes.len() - 3..], &[0xFF, 0x00, 0x00]);
    }

    #[test]
    fn test_push_tag_covers_header_and_payload_not_header_alone() {
        // Arrange
        let bytes = Packet::push_with_header(fixed_header(), Color::new(1, 2, 3), &secret())
            .unwrap()
            .encode();
        let header = &bytes[..17];
        let tag = &bytes[17..49];
        let payload = &bytes[49..];

        // Act
        let mut header_and_payload = header.to_vec();
        header_and_payload.extend_from_slice(payload);
        let over_both = compute_tag(&secret(), &header_and_payload).unwrap();
        let over_header = compute_tag(&secret(), header).unwrap();

        // Assert
        assert_eq!(&over_both.0[..], tag);
        assert_ne!(&over_header.0[..], tag);
    }

    // ── Request ──────────────────────────────────────────────────────────────

    #[test]
    fn test_request_packet_layout_and_tag_coverage() {
        // Arrange / Act
        let bytes = Packet::request_with_header(fixed_header(), &secret())
            .unwrap()
            .encode();

        // Assert
        assert_eq!(bytes.len(), 50);
        assert_eq!(bytes[16], 3);
        assert_eq!(bytes[17], 1);
        let over_header = compute_tag(&secret(), &bytes[..18]).unwrap();
        assert_eq!(&over_header.0[..], &bytes[18..50]);
    }

    #[test]
    fn test_fresh_packets_differ() {
        let a = Packet::request(&secret()).unwrap().encode();
        let b = Packet::request(&secret()).unwrap().encode();
        assert_ne!(a, b, "fresh nonces must make packets distinct");
    }

    // ── Decode / verify ──────────────────────────────────────────────────────

    #[test]
    fn test_decode_then_verify_accepts_genuine_packets() {
        for packet in [
            Packet::push_with_header(fixed_header(), Color::new(9, 8, 7), &secret()).unwrap(),
            Packet::request_with_header(fixed_header(), &secret()).unwrap(),
        ] {
            let decoded = Packet::decode(&packet.encode()).expect("decode");
            assert_eq!(decoded, packet);
            assert_eq!(decoded.verify(&secret()), Ok(()));
        }
    }

    #[test]
    fn test_verify_rejects_tampered_payload() {
        // Arrange
        let mut bytes = Packet::push_with_header(fixed_header(), Color::new(0, 0, 0), &secret())
            .unwrap()
            .encode();
        bytes[51] = 0xFF;

        // Act
        let decoded = Packet::decode(&bytes).unwrap();

        // Assert
        assert_eq!(
            decoded.verify(&secret()),
            Err(ProtocolError::Auth(AuthError::TagMismatch))
        );
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let packet = Packet::request(&secret()).unwrap();
        assert!(packet.verify(&SharedSecret::new("not the secret")).is_err());
    }

    #[test]
    fn test_push_tag_does_not_verify_as_request() {
        // Arrange: a push packet's header+tag reinterpreted as a request
        let push = Packet::push_with_header(fixed_header(), Color::new(1, 1, 1), &secret()).unwrap();
        let forged = Packet::Request {
            header: *push.header(),
            tag: *push.tag(),
        };

        // Assert
        assert!(forged.verify(&secret()).is_err());
    }

    #[test]
    fn test_decode_rejects_truncated_and_oversized() {
        let bytes = Packet::request(&secret()).unwrap().encode();
        assert!(matches!(
            Packet::decode(&bytes[..40]),
            Err(ProtocolError::InsufficientData { needed: 50, .. })
        ));
        let mut long = bytes.clone();
        long.push(0);
        assert!(matches!(
            Packet::decode(&long),
            Err(ProtocolError::TrailingData { expected: 50, available: 51 })
        ));
    }

    #[test]
    fn test_wire_len_for_version() {
        assert_eq!(wire_len_for_version(1), Some(52));
        assert_eq!(wire_len_for_version(3), Some(50));
        assert_eq!(wire_len_for_version(2), None);
    }
}
