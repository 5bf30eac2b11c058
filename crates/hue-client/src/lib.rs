//! hue-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does hue-client do? (for beginners)
//!
//! The *client* is the wrist-worn color picker.  The UI that renders the
//! picker is not part of this crate: it hands a [`hue_core::Color`] to
//! [`ColorExchangeClient`] and gets one back.  The client:
//!
//! 1. Pushes the selected color to the remote device in a 52-byte push
//!    packet, without waiting for an answer.
//! 2. Asks the device for its current color with a 50-byte request packet
//!    and reads the color out of the reply.
//!
//! Every call opens its own TCP connection, writes one packet, optionally
//! reads one reply, and closes the connection.  Nothing is shared between
//! calls, so pushes and requests can run concurrently without locking.

/// Application layer: the color exchange use case.
pub mod application;

/// Infrastructure layer: TCP transport and configuration storage.
pub mod infrastructure;

pub use application::exchange_color::{
    ColorExchangeClient, ExchangeSettings, PullOutcome, PushOutcome, Target,
};
pub use application::transport::{Endpoint, Transport, TransportError};
pub use infrastructure::network::{TcpTransport, TcpTransportConfig};
