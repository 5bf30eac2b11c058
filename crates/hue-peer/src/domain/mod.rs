//! Domain types for the peer.

pub mod config;

pub use config::PeerConfig;
