//! Infrastructure layer for the client application.
//!
//! **Dependency rule**: this layer may depend on `application` and `hue_core`,
//! but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`network`** – [`network::TcpTransport`], the TCP implementation of
//!   the application's `Transport` port: connect, write one packet,
//!   optionally read the reply, close.  A recording fake lives in
//!   `network::mock` for tests.
//!
//! - **`storage`** – TOML configuration: push and pull targets, shared
//!   secrets, and transport timeouts.

pub mod network;
pub mod storage;
