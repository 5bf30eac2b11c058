//! Decoding of the peer's reply to a request packet.
//!
//! Two readers exist for the same bytes:
//!
//! - [`decode_response_color`] is the blind reader deployed clients use.  It
//!   treats the reply as opaque and reads offsets `8`, `9` and `10` as red,
//!   green and blue, substituting `0` for any byte that is missing.  A
//!   truncated reply is therefore indistinguishable from black.
//!
//! - [`ColorReport::verify`] checks the reply's own tag first.  The report
//!   layout keeps the color at the same offsets, so both readers agree on
//!   every genuine reply:
//!
//! ```text
//! [timestamp:8][r:1][g:1][b:1][tag:32]                        = 43 bytes
//! tag = HMAC-SHA256(secret, timestamp ∥ r ∥ g ∥ b ∥ request_nonce)
//! ```
//!
//! The request nonce is not repeated on the wire: both sides already know it,
//! and mixing it into the tag ties a report to the request that asked for it.

use crate::domain::color::Color;
use crate::protocol::auth::{compute_tag_over, verify_tag, SharedSecret, Tag, TAG_SIZE};
use crate::protocol::header::unix_now_secs;
use crate::protocol::packet::ProtocolError;

/// Offset of the red channel in a response.
pub const RESPONSE_COLOR_OFFSET: usize = 8;

/// Shortest response that carries all three channels.
pub const MIN_COLOR_RESPONSE_LEN: usize = RESPONSE_COLOR_OFFSET + 3;

/// Wire length of a [`ColorReport`].
pub const REPORT_SIZE: usize = MIN_COLOR_RESPONSE_LEN + TAG_SIZE;

/// Reads the color at offsets `[8, 9, 10]`, defaulting missing bytes to `0`.
///
/// # Examples
///
/// ```rust
/// use hue_core::{decode_response_color, Color};
///
/// assert_eq!(decode_response_color(&[0u8; 5]), Color::BLACK);
/// ```
pub fn decode_response_color(bytes: &[u8]) -> Color {
    let channel = |i: usize| bytes.get(RESPONSE_COLOR_OFFSET + i).copied().unwrap_or(0);
    Color::new(channel(0), channel(1), channel(2))
}

/// The peer's authenticated answer to a request packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorReport {
    /// Unix seconds when the peer produced the report.
    pub timestamp: i64,
    /// The color the peer currently holds.
    pub color: Color,
}

impl ColorReport {
    /// A report for `color` stamped with the current time.
    pub fn now(color: Color) -> Self {
        Self {
            timestamp: unix_now_secs(),
            color,
        }
    }

    /// Serializes the report and tags it for the request with `request_nonce`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Auth`] if the tag cannot be computed.
    pub fn encode(&self, secret: &SharedSecret, request_nonce: u64) -> Result<Vec<u8>, ProtocolError> {
        let body = self.body();
        let tag = compute_tag_over(secret, &[&body[..], &request_nonce.to_be_bytes()[..]])?;
        let mut buf = Vec::with_capacity(REPORT_SIZE);
        buf.extend_from_slice(&body);
        buf.extend_from_slice(tag.as_bytes());
        Ok(buf)
    }

    /// Parses `bytes` as a report and checks its tag against `request_nonce`.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::InsufficientData`] / [`ProtocolError::TrailingData`]
    ///   if `bytes` is not exactly [`REPORT_SIZE`] long.
    /// - [`ProtocolError::Auth`] if the tag does not verify.
    pub fn verify(
        bytes: &[u8],
        secret: &SharedSecret,
        request_nonce: u64,
    ) -> Result<Self, ProtocolError> {
        if bytes.len() < REPORT_SIZE {
            return Err(ProtocolError::InsufficientData {
                needed: REPORT_SIZE,
                available: bytes.len(),
            });
        }
        if bytes.len() > REPORT_SIZE {
            return Err(ProtocolError::TrailingData {
                expected: REPORT_SIZE,
                available: bytes.len(),
            });
        }

        let body = &bytes[..MIN_COLOR_RESPONSE_LEN];
        let tag = Tag::from_slice(&bytes[MIN_COLOR_RESPONSE_LEN..]).ok_or(
            ProtocolError::InsufficientData {
                needed: REPORT_SIZE,
                available: bytes.len(),
            },
        )?;
        verify_tag(secret, &[body, &request_nonce.to_be_bytes()[..]], &tag)?;

        let mut ts = [0u8; 8];
        ts.copy_from_slice(&bytes[..RESPONSE_COLOR_OFFSET]);
        Ok(Self {
            timestamp: i64::from_be_bytes(ts),
            color: decode_response_color(bytes),
        })
    }

    fn body(&self) -> [u8; MIN_COLOR_RESPONSE_LEN] {
        let mut body = [0u8; MIN_COLOR_RESPONSE_LEN];
        body[..RESPONSE_COLOR_OFFSET].copy_from_slice(&self.timestamp.to_be_bytes());
        body[RESPONSE_COLOR_OFFSET..].copy_from_slice(&self.color.to_payload());
        body
    }
}
