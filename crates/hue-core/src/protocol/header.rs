//! Fixed-size packet header: construction and parsing.
//!
//! Wire format:
//! ```text
//! push:    [timestamp:8][nonce:8][version=1:1]                 = 17 bytes
//! request: [timestamp:8][nonce:8][version=3:1][request_flag=1:1] = 18 bytes
//! ```
//! All multi-byte integers are big-endian.  There is no length prefix: a
//! reader must know the shape of each version, which [`PacketKind`] encodes.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;

use crate::protocol::packet::ProtocolError;

/// Size of the part shared by every header: timestamp + nonce + version.
pub const HEADER_PREFIX_SIZE: usize = 17;

/// Version byte of a push packet.
pub const PUSH_VERSION: u8 = 1;

/// Version byte of a request packet.
pub const REQUEST_VERSION: u8 = 3;

/// Value of the trailing request flag byte.
pub const REQUEST_FLAG: u8 = 1;

/// The two packet kinds, distinguished on the wire by the version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    /// Carries a color payload; the tag covers header and payload.
    Push,
    /// Asks the peer for its current color; the tag covers the header only.
    Request,
}

impl PacketKind {
    /// The version byte written for this kind.
    pub const fn version(self) -> u8 {
        match self {
            PacketKind::Push => PUSH_VERSION,
            PacketKind::Request => REQUEST_VERSION,
        }
    }

    /// Maps a version byte back to a kind.
    pub const fn from_version(version: u8) -> Option<Self> {
        match version {
            PUSH_VERSION => Some(PacketKind::Push),
            REQUEST_VERSION => Some(PacketKind::Request),
            _ => None,
        }
    }

    /// Encoded header length: 17 bytes for push, 18 for request.
    pub const fn header_len(self) -> usize {
        match self {
            PacketKind::Push => HEADER_PREFIX_SIZE,
            PacketKind::Request => HEADER_PREFIX_SIZE + 1,
        }
    }

    /// Payload length: 3 bytes for push, none for request.
    pub const fn payload_len(self) -> usize {
        match self {
            PacketKind::Push => 3,
            PacketKind::Request => 0,
        }
    }

    /// Total wire length: 52 bytes for push, 50 for request.
    pub const fn wire_len(self) -> usize {
        self.header_len() + crate::protocol::auth::TAG_SIZE + self.payload_len()
    }
}

/// The variable fields of a header.  The version byte and request flag are
/// implied by the [`PacketKind`] the header is encoded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    /// Unix seconds at construction time.
    pub timestamp: i64,
    /// Random value, one per packet.
    pub nonce: u64,
}

impl Header {
    pub const fn new(timestamp: i64, nonce: u64) -> Self {
        Self { timestamp, nonce }
    }

    /// Captures the current Unix time and a fresh random nonce.
    pub fn now() -> Self {
        Self {
            timestamp: unix_now_secs(),
            nonce: rand::thread_rng().next_u64(),
        }
    }
}

/// Current Unix time in whole seconds; `0` if the clock is before the epoch.
pub fn unix_now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Serializes `header` in the layout of `kind`.
pub fn encode_header(header: &Header, kind: PacketKind) -> Vec<u8> {
    let mut buf = Vec::with_capacity(kind.header_len());
    buf.extend_from_slice(&header.timestamp.to_be_bytes());
    buf.extend_from_slice(&header.nonce.to_be_bytes());
    buf.push(kind.version());
    if kind == PacketKind::Request {
        buf.push(REQUEST_FLAG);
    }
    buf
}

/// Builds a fresh header: 17 bytes when `is_request` is false, 18 when true.
///
/// # Examples
///
/// ```rust
/// use hue_core::build_header;
///
/// assert_eq!(build_header(false).len(), 17);
/// assert_eq!(build_header(true).len(), 18);
/// ```
pub fn build_header(is_request: bool) -> Vec<u8> {
    let kind = if is_request {
        PacketKind::Request
    } else {
        PacketKind::Push
    };
    encode_header(&Header::now(), kind)
}

/// Parses a header from the beginning of `bytes`.
///
/// Trailing bytes (tag, payload) are ignored; use
/// [`PacketKind::header_len`] on the returned kind to find where they start.
///
/// # Errors
///
/// - [`ProtocolError::InsufficientData`] if `bytes` is shorter than the header.
/// - [`ProtocolError::UnsupportedVersion`] for a version other than 1 or 3.
/// - [`ProtocolError::MalformedHeader`] if a request's flag byte is not `1`.
pub fn decode_header(bytes: &[u8]) -> Result<(Header, PacketKind), ProtocolError> {
    if bytes.len() < HEADER_PREFIX_SIZE {
        return Err(ProtocolError::InsufficientData {
            needed: HEADER_PREFIX_SIZE,
            available: bytes.len(),
        });
    }

    let timestamp = i64::from_be_bytes(read_array(bytes, 0));
    let nonce = u64::from_be_bytes(read_array(bytes, 8));
    let version = bytes[16];
    let kind = PacketKind::from_version(version).ok_or(ProtocolError::UnsupportedVersion(version))?;

    if kind == PacketKind::Request {
        let flag = *bytes.get(HEADER_PREFIX_SIZE).ok_or(ProtocolError::InsufficientData {
            needed: kind.header_len(),
            available: bytes.len(),
        })?;
        if flag != REQUEST_FLAG {
            return Err(ProtocolError::MalformedHeader(format!(
                "request flag must be {REQUEST_FLAG}, got {flag}"
            )));
        }
    }

    Ok((Header::new(timestamp, nonce), kind))
}

/// Copies 8 bytes starting at `offset`.  Callers check the length first.
fn read_array(bytes: &[u8], offset: usize) -> [u8; 8] {
    let mut out = [0u8; 8];
    out.copy_from_slice(&bytes[offset..offset + 8]);
    out
}
