//! Domain layer for hub-discovery.
//!
//! Only configuration lives here; the candidate model itself belongs to
//! `hub-core`, which this crate shares with anything else that needs to
//! read mDNS advertisements.
//!
//! Nothing in this module touches sockets, files or the environment.

pub mod config;

pub use config::{
    DiscoveryConfig, TransportConfig, VerificationConfig, DEFAULT_DISCOVERY_TIMEOUT,
    DEFAULT_IDENTITY_HEADER, DEFAULT_SERVICE_TYPES, DEFAULT_VERIFY_MARGIN, DEFAULT_VERIFY_PATH,
};
