//! Storage infrastructure: the optional TOML configuration file.
//!
//! Only the binary reads it. The library takes a plain `DiscoveryConfig`,
//! so embedding callers and tests never touch the file system.

pub mod config;
