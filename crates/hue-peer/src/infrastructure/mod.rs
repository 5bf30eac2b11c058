//! Infrastructure layer of the peer.
//!
//! - **`listener`** – TCP accept loop and per-connection framing: read the
//!   17-byte prefix, size the rest from the version byte, hand the packet to
//!   the [`crate::ColorDevice`], write the reply, close.

pub mod listener;
