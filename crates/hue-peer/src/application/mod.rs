//! Application layer of the peer.
//!
//! - **`handle_packet`** – [`handle_packet::ColorDevice`]: decode, verify,
//!   replay-check, then store a pushed color or report the current one.

pub mod handle_packet;
