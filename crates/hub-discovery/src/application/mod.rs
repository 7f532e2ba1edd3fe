//! Application layer use cases for hub discovery.
//!
//! # What is the "application" layer? (for beginners)
//!
//! Use cases in this layer orchestrate the pure `hub-core` logic to fulfil
//! one user goal: "tell me which hubs are on this network". They depend on
//! traits rather than on sockets or HTTP clients, so every rule here can be
//! tested with scripted doubles.
//!
//! # Sub-modules
//!
//! - **`transport`** – The datagram port (`DatagramTransport`,
//!   `TransportFactory`) and the deadline-bounded `Datagrams` sequence.
//!
//! - **`verify_candidates`** – The `HubProbe` port and the policy that keeps
//!   only confirmed candidates, sequentially or with bounded concurrency.
//!
//! - **`discover_hubs`** – The two-phase discovery run tying it all together.

pub mod discover_hubs;
pub mod transport;
pub mod verify_candidates;
