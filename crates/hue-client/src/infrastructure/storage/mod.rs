//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the client's TOML configuration from the
//! platform-appropriate directory (or an explicit path), fills in defaults for
//! anything missing, and converts the result into the settings the
//! application and network layers take.

pub mod config;
