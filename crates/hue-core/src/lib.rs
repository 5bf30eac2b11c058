//! # hue-core
//!
//! Shared library for HueLink containing the color model and the
//! authenticated color exchange protocol.
//!
//! This crate is used by both the client (the wrist-worn picker) and the peer
//! (the device that displays the color).  It has zero dependencies on OS
//! APIs, UI frameworks, or network sockets.
//!
//! # Architecture overview (for beginners)
//!
//! HueLink moves one thing over the network: a color made of three bytes.
//! The client either *pushes* a color to the peer, or *requests* the color
//! the peer currently shows.  Every packet starts with a small fixed header
//! and carries an HMAC-SHA256 tag so the peer can tell it was produced by
//! someone holding the shared secret.
//!
//! This crate (`hue-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – The [`Color`] value type and its conversions between
//!   normalized `0.0..=1.0` components and 8-bit channels.
//!
//! - **`protocol`** – How bytes travel over the network: the header codec,
//!   the tag authenticator, the two packet kinds (push and request), the
//!   peer's response frame, and the replay guard a verifying peer uses.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `hue_core::Packet` instead of `hue_core::protocol::packet::Packet`.
pub use domain::color::{Color, ColorParseError};
pub use protocol::auth::{AuthError, SharedSecret, Tag};
pub use protocol::header::{build_header, Header, PacketKind};
pub use protocol::packet::{Packet, ProtocolError};
pub use protocol::response::{decode_response_color, ColorReport};
