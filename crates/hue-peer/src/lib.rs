//! hue-peer library entry point.
//!
//! The *peer* is the device end of HueLink: it holds the color currently on
//! display, accepts pushes that change it, and answers requests with an
//! authenticated [`hue_core::ColorReport`].
//!
//! - **`domain`** – [`PeerConfig`], the plain runtime settings.
//! - **`application`** – [`ColorDevice`], which checks a packet's tag and
//!   freshness and then applies it.
//! - **`infrastructure`** – [`PeerServer`], the TCP accept loop.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::handle_packet::{ColorDevice, PeerError, PeerReply};
pub use domain::config::PeerConfig;
pub use infrastructure::listener::{ListenerError, PeerServer};
