//! Replay protection for a verifying peer.
//!
//! # Why a nonce alone is not enough (for beginners)
//!
//! Every packet carries a random nonce and a timestamp, but a valid packet
//! recorded off the network stays valid forever unless the receiver remembers
//! what it has already accepted.  [`ReplayGuard`] makes both fields meaningful:
//!
//! - A packet whose timestamp is further than `window` seconds from the
//!   receiver's clock (in either direction) is **stale** and rejected.
//! - Inside the window, each nonce is accepted once.  A second packet with
//!   the same nonce is a **duplicate** and rejected.
//!
//! Nonces only need to be remembered for as long as their timestamp is still
//! inside the window; older entries are pruned on every check, so memory is
//! bounded by the packet rate times the window length.
//!
//! Only call [`ReplayGuard::check`] *after* the packet's tag verified, or an
//! attacker can fill the ledger with forged nonces.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use crate::protocol::header::Header;

/// Reasons a replay check can fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The header timestamp is outside the freshness window.
    #[error("stale packet: timestamp {timestamp} is more than {window_secs}s from now ({now})")]
    Stale {
        timestamp: i64,
        now: i64,
        window_secs: u64,
    },

    /// The nonce was already accepted inside the window.
    #[error("duplicate nonce {nonce:#018x}")]
    Duplicate { nonce: u64 },
}

/// Tracks nonces seen within a freshness window.
#[derive(Debug)]
pub struct ReplayGuard {
    window_secs: u64,
    /// nonce → timestamp of the packet that used it
    seen: HashMap<u64, i64>,
}

impl ReplayGuard {
    /// Creates a guard accepting timestamps within `window` of the local clock.
    pub fn new(window: Duration) -> Self {
        Self {
            window_secs: window.as_secs(),
            seen: HashMap::new(),
        }
    }

    /// Number of nonces currently remembered.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Accepts `header` if it is fresh and its nonce is new, recording the
    /// nonce.  `now` is the local Unix time in seconds.
    ///
    /// # Errors
    ///
    /// [`ReplayError::Stale`] or [`ReplayError::Duplicate`].
    pub fn check(&mut self, header: &Header, now: i64) -> Result<(), ReplayError> {
        self.prune(now);

        if header.timestamp.abs_diff(now) > self.window_secs {
            return Err(ReplayError::Stale {
                timestamp: header.timestamp,
                now,
                window_secs: self.window_secs,
            });
        }

        if self.seen.contains_key(&header.nonce) {
            return Err(ReplayError::Duplicate {
                nonce: header.nonce,
            });
        }

        self.seen.insert(header.nonce, header.timestamp);
        Ok(())
    }

    fn prune(&mut self, now: i64) {
        let window = self.window_secs;
        self.seen.retain(|_, ts| ts.abs_diff(now) <= window);
    }
}
