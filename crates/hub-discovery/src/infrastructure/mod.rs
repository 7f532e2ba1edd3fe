//! Infrastructure layer for hub discovery.
//!
//! Contains the OS-facing adapters: the UDP multicast transport, the HTTP
//! health check, the TOML config file and terminal rendering.
//!
//! **Dependency rule**: this layer may depend on `application` and `hub_core`,
//! but MUST NOT be imported by the `application` or domain layers.

pub mod console;
pub mod network;
pub mod storage;
