//! The [`Color`] value type exchanged by the protocol.
//!
//! # Normalized components vs. channels (for beginners)
//!
//! UI toolkits usually describe a color as three floating-point components
//! between `0.0` and `1.0`.  On the wire, each component travels as a single
//! unsigned byte (a *channel*) between `0` and `255`.
//!
//! The conversion is `round(component * 255)` narrowed to a byte.  Narrowing
//! *wraps around* instead of clamping: a component of `1.2` becomes
//! `round(306.0) = 306`, which wraps to `306 - 256 = 50`.  Out-of-range
//! components are a caller bug; the wrap keeps the byte layout identical to
//! what deployed peers already receive.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when a `#RRGGBB` string cannot be parsed into a [`Color`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    /// The string (without the optional `#`) is not exactly six characters.
    #[error("expected 6 hex digits, got {0}")]
    InvalidLength(usize),

    /// A character pair is not a valid hexadecimal byte.
    #[error("invalid hex digits: {0:?}")]
    InvalidDigit(String),
}

/// An RGB color with three independent 8-bit channels.
///
/// # Examples
///
/// ```rust
/// use hue_core::Color;
///
/// let red = Color::from_unit(1.0, 0.0, 0.0);
/// assert_eq!(red, Color::new(0xFF, 0x00, 0x00));
/// assert_eq!(red.to_string(), "#FF0000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Pure black, also the value produced for absent response bytes.
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    /// Creates a color from raw channel bytes.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Creates a color from normalized `0.0..=1.0` components.
    ///
    /// Each component is mapped with [`channel_from_unit`].
    pub fn from_unit(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: channel_from_unit(r),
            g: channel_from_unit(g),
            b: channel_from_unit(b),
        }
    }

    /// Returns the normalized `(r, g, b)` components in `0.0..=1.0`.
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }

    /// Returns the 3-byte wire payload `[red, green, blue]`.
    pub const fn to_payload(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Builds a color from a 3-byte wire payload.
    pub const fn from_payload(payload: [u8; 3]) -> Self {
        Self::new(payload[0], payload[1], payload[2])
    }
}

/// Maps a normalized component to a channel byte: `round(c * 255)` with
/// wrap-around narrowing.  `NaN` maps to `0`.
pub fn channel_from_unit(component: f32) -> u8 {
    // `f32 as i32` saturates (and maps NaN to 0); `i32 as u8` then keeps the
    // low 8 bits, which is the wrap-around.
    (component * 255.0).round() as i32 as u8
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Parses `#RRGGBB` or `RRGGBB` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.chars().count() != 6 {
            return Err(ColorParseError::InvalidLength(digits.chars().count()));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit(digits.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range.clone()], 16)
                .map_err(|_| ColorParseError::InvalidDigit(digits[range].to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}
