//! hub-discovery library crate.
//!
//! Finds smart-home hubs on the local network with multicast DNS and keeps
//! only the ones that answer an HTTP health check.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! caller (timeout, CancellationToken)
//!         ↓
//! [hub-discovery]
//!   ├── domain/           DiscoveryConfig (plain settings, no I/O)
//!   ├── application/      DiscoverHubsUseCase, verification policy, ports
//!   └── infrastructure/
//!         ├── network/    UDP multicast transport, reqwest health check
//!         ├── storage/    TOML config file (binary only)
//!         └── console     JSON / table rendering (binary only)
//!         ↓
//! [hub-core]              mDNS codec, Candidate, extraction, dedup
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use hub_discovery::{domain::DiscoveryConfig, hub_discovery};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let discovery = hub_discovery(&DiscoveryConfig::default())?;
//! let hubs = discovery
//!     .discover_and_verify(Duration::from_secs(5), &CancellationToken::new())
//!     .await?;
//! for hub in &hubs {
//!     println!("{} {:?}", hub.address(), hub.hub_id());
//! }
//! # Ok(())
//! # }
//! ```

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: discovery and verification use cases.
pub mod application;

/// Infrastructure layer: sockets, HTTP, config file, terminal output.
pub mod infrastructure;

pub use application::discover_hubs::DiscoverHubsUseCase;
pub use application::transport::DiscoveryError;
pub use hub_core::Candidate;

use domain::DiscoveryConfig;
use infrastructure::network::health_check::{HealthCheckError, HttpHubProbe};
use infrastructure::network::transport::MulticastTransportFactory;

/// The production wiring: UDP multicast transport plus HTTP health check.
pub type HubDiscovery = DiscoverHubsUseCase<MulticastTransportFactory, HttpHubProbe>;

/// Builds a [`HubDiscovery`] from `config`.
///
/// # Errors
///
/// Returns [`HealthCheckError`] if the HTTP client cannot be built from the
/// verification settings.
pub fn hub_discovery(config: &DiscoveryConfig) -> Result<HubDiscovery, HealthCheckError> {
    let probe = HttpHubProbe::new(&config.verification)?;
    Ok(DiscoverHubsUseCase::new(
        MulticastTransportFactory::new(config.transport.clone()),
        probe,
        config.service_types.clone(),
        config.verification.max_concurrent,
    )
    .with_verification_margin(config.verification.deadline_margin))
}
