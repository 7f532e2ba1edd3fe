//! # hub-core
//!
//! Shared library for local hub discovery containing the multicast DNS codec
//! and the domain model of a hub candidate.
//!
//! It does no I/O. Sockets, timers and HTTP clients live in `hub-discovery`.
//!
//! # Architecture overview (for beginners)
//!
//! A hub announces itself on the local network with multicast DNS service
//! discovery (DNS-SD). A browser sends a PTR question for a service type such
//! as `_homey._tcp.local.` and every hub replies with a handful of records
//! describing where it can be reached.
//!
//! This crate is the pure half of that conversation:
//!
//! - **`protocol`** – How bytes travel over the network.  The RFC 1035 wire
//!   format is `hickory-proto`'s job; this module builds the one browse
//!   query discovery sends and turns decode failures into one error type.
//!
//! - **`domain`** – What the replies mean.  The records of one reply are
//!   folded into a `Candidate`, and candidates from many replies are
//!   deduplicated by address.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `hub_core::Candidate` instead of `hub_core::domain::candidate::Candidate`.
pub use domain::candidate::{Candidate, CandidateError, HubAttributes, Scheme, SECURE_PORT};
pub use domain::collector::CandidateSet;
pub use domain::extract::extract_candidate;
pub use protocol::codec::{decode_message, encode_query, is_response, ProtocolError};

/// The DNS message model used throughout this crate.
pub use hickory_proto as dns;
