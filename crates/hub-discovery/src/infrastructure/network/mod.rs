//! Network infrastructure for hub discovery.
//!
//! # Sub-modules
//!
//! - **`transport`** – Binds an ephemeral UDP socket, sends PTR browse
//!   queries to the multicast group and reads the unicast replies.
//!
//! - **`health_check`** – Confirms a candidate with an HTTP GET and reads the
//!   hub identifier from a response header.

pub mod health_check;
pub mod transport;
