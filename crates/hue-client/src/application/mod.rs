//! Application layer use cases for the client.
//!
//! - **`exchange_color`** – Builds push and request packets, hands them to a
//!   [`transport::Transport`] injected at construction time, and turns the
//!   transport's result into an outcome the UI can act on.
//!
//! - **`transport`** – The `Transport` trait (the port the infrastructure
//!   layer implements), the [`transport::Endpoint`] it connects to, and its
//!   error type.

pub mod exchange_color;
pub mod transport;
