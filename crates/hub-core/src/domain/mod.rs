//! Domain entities for hub discovery.
//!
//! This module contains pure logic with no sockets, timers or HTTP clients.
//!
//! # What lives here? (for beginners)
//!
//! Discovery gathers many small, partial facts from the network. The domain
//! layer decides what those facts *mean*:
//!
//! - **`candidate`** – the value object describing one possible hub and the
//!   rules its address obeys.
//! - **`extract`** – folds the records of one multicast DNS response into a
//!   candidate (or decides there is none).
//! - **`collector`** – removes duplicates while keeping arrival order.
//!
//! Everything here can be unit-tested with hand-built messages; nothing
//! needs a network.

pub mod candidate;
pub mod collector;
pub mod extract;
