//! HMAC-SHA256 packet authentication.
//!
//! # What is an HMAC? (for beginners)
//!
//! An HMAC is a keyed hash: `tag = HMAC(secret, message)`.  Anyone can hash a
//! message, but only someone who knows the secret can produce the matching
//! tag.  The receiver recomputes the tag over the bytes it received and
//! accepts the packet only if both tags are equal.
//!
//! # Constant-time comparison
//!
//! Comparing tags with `==` stops at the first differing byte, so the time it
//! takes leaks how many leading bytes an attacker guessed right.
//! [`verify_tag`] delegates to `Mac::verify_slice`, which compares every byte
//! regardless of where the first difference is.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 tag in bytes.
pub const TAG_SIZE: usize = 32;

/// Errors produced by the authenticator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The MAC primitive refused the key material.
    #[error("could not initialise HMAC-SHA256 with the configured secret")]
    CryptoInit,

    /// The recomputed tag does not match the received one.
    #[error("authentication tag mismatch")]
    TagMismatch,
}

/// The static secret shared by both ends of the protocol.
///
/// `Debug` is redacted so the secret never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The UTF-8 key bytes fed to the MAC.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(self.as_bytes()).map_err(|_| AuthError::CryptoInit)
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

impl From<&str> for SharedSecret {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SharedSecret {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A 32-byte HMAC-SHA256 tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; TAG_SIZE]);

impl Tag {
    pub fn as_bytes(&self) -> &[u8; TAG_SIZE] {
        &self.0
    }

    /// Reads a tag from the first [`TAG_SIZE`] bytes of `bytes`.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; TAG_SIZE] = bytes.get(..TAG_SIZE)?.try_into().ok()?;
        Some(Self(raw))
    }
}

/// Computes `HMAC-SHA256(secret, message)`.
///
/// # Errors
///
/// Returns [`AuthError::CryptoInit`] if the MAC cannot be keyed.
///
/// # Examples
///
/// ```rust
/// use hue_core::protocol::{compute_tag, SharedSecret};
///
/// let secret = SharedSecret::new("SHARED_SECRET");
/// let a = compute_tag(&secret, b"hello").unwrap();
/// let b = compute_tag(&secret, b"hello").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn compute_tag(secret: &SharedSecret, message: &[u8]) -> Result<Tag, AuthError> {
    compute_tag_over(secret, &[message])
}

/// Computes the tag over the concatenation of `parts` without allocating it.
pub fn compute_tag_over(secret: &SharedSecret, parts: &[&[u8]]) -> Result<Tag, AuthError> {
    let mut mac = secret.mac()?;
    for part in parts {
        mac.update(part);
    }
    Ok(Tag(mac.finalize().into_bytes().into()))
}

/// Verifies `expected` against the tag of the concatenated `parts`, in
/// constant time.
///
/// # Errors
///
/// [`AuthError::TagMismatch`] when the tags differ, [`AuthError::CryptoInit`]
/// if the MAC cannot be keyed.
pub fn verify_tag(secret: &SharedSecret, parts: &[&[u8]], expected: &Tag) -> Result<(), AuthError> {
    let mut mac = secret.mac()?;
    for part in parts {
        mac.update(part);
    }
    mac.verify_slice(expected.as_bytes())
        .map_err(|_| AuthError::TagMismatch)
}
