//! Space-separated hex rendering of byte buffers for debug logs.

use std::fmt;

/// Formats a byte slice as `0A 1B 2C` without allocating.
///
/// ```rust
/// use hue_core::protocol::HexBytes;
///
/// assert_eq!(HexBytes(&[0x0A, 0xFF]).to_string(), "0A FF");
/// ```
pub struct HexBytes<'a>(pub &'a [u8]);

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}
