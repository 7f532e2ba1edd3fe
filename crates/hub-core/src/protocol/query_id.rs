//! Thread-safe counter for DNS query identifiers.
//!
//! # Why number queries? (for beginners)
//!
//! Every DNS message starts with a 16-bit *identifier*.  A responder that
//! answers a query sent from an ephemeral port copies that identifier into
//! its reply, which makes packet captures easy to read: the answers to the
//! second browse query carry id 1, the answers to the third carry id 2, and so on.
//!
//! The discovery code does not reject replies by identifier.  Multicast
//! responders are allowed to answer with id 0 regardless of what was asked.
//!
//! # Thread safety
//!
//! The counter is an `AtomicU16`, so one counter may be shared between
//! several transports without a lock.

use std::sync::atomic::{AtomicU16, Ordering};

/// A thread-safe counter handing out query identifiers.
///
/// Identifiers start at the seed (0 by default) and wrap from `u16::MAX`
/// back to 0 without panicking.
///
/// # Examples
///
/// ```rust
/// use hub_core::protocol::QueryIdCounter;
///
/// let ids = QueryIdCounter::new();
/// assert_eq!(ids.next(), 0);
/// assert_eq!(ids.next(), 1);
/// ```
#[derive(Debug)]
pub struct QueryIdCounter {
    inner: AtomicU16,
}

impl QueryIdCounter {
    /// Creates a counter starting at 0.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a counter whose first identifier is `seed`.
    pub fn starting_at(seed: u16) -> Self {
        Self {
            inner: AtomicU16::new(seed),
        }
    }

    /// Returns the next identifier and advances the counter.
    pub fn next(&self) -> u16 {
        // Relaxed is enough: ids carry no memory-ordering meaning.
        self.inner.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for QueryIdCounter {
    fn default() -> Self {
        Self::new()
    }
}
