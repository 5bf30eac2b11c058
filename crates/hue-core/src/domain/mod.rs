//! Domain layer: value types with no I/O and no protocol knowledge.
//!
//! # Sub-modules
//!
//! - **`color`** – [`color::Color`], three independent 8-bit channels.  The
//!   protocol is colorspace-agnostic and only moves these raw bytes; any
//!   hue/saturation math belongs to the UI that owns the picker.

pub mod color;

pub use color::{Color, ColorParseError};
