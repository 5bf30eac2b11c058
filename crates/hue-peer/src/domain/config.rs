//! Peer configuration.
//!
//! [`PeerConfig`] is built once at startup from CLI arguments (see `main.rs`)
//! or from defaults in tests.  Nothing in the peer reads environment
//! variables directly.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use hue_core::{Color, SharedSecret};

/// All runtime configuration for the peer.
#[derive(Debug, Clone)]
pub struct PeerConfig {
    /// Address the TCP listener binds to.
    pub bind_addr: SocketAddr,

    /// Secret the client keys its tags with.
    pub secret: SharedSecret,

    /// How far a packet's timestamp may be from the peer's clock, in either
    /// direction, and how long seen nonces are remembered.
    pub freshness_window: Duration,

    /// Upper bound on reading one packet from a connection.
    pub read_timeout: Duration,

    /// Color reported before the first push arrives.
    pub initial_color: Color,
}

impl Default for PeerConfig {
    /// | Field            | Default          |
    /// |------------------|------------------|
    /// | bind_addr        | `0.0.0.0:3384`   |
    /// | secret           | `SHARED_SECRET`  |
    /// | freshness_window | 30 seconds       |
    /// | read_timeout     | 3 seconds        |
    /// | initial_color    | `#000000`        |
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 3384)),
            secret: SharedSecret::new("SHARED_SECRET"),
            freshness_window: Duration::from_secs(30),
            read_timeout: Duration::from_secs(3),
            initial_color: Color::BLACK,
        }
    }
}
