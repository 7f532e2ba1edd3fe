//! Discovery configuration types.
//!
//! [`DiscoveryConfig`] carries every tunable the discovery run needs. It is a
//! plain struct: no global state and no environment reads. The binary fills
//! it from the TOML file and CLI flags; tests build it directly, usually
//! pointing the multicast target at a loopback responder so parallel runs do
//! not interfere.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use hub_core::protocol::{MDNS_IPV4_GROUP, MDNS_PORT};

/// Discovery window used when the caller passes a zero timeout.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Service types browsed on every run, in query order.
pub const DEFAULT_SERVICE_TYPES: [&str; 2] = ["_homey._tcp.local.", "_athom._tcp.local."];

/// Time the verification phase may run on after the discovery window closes.
pub const DEFAULT_VERIFY_MARGIN: Duration = Duration::from_secs(2);

/// Health-check path appended to a candidate address.
pub const DEFAULT_VERIFY_PATH: &str = "/api/manager/system/ping";

/// Response header carrying the hub identifier.
pub const DEFAULT_IDENTITY_HEADER: &str = "X-Homey-ID";

/// Socket-level settings for the multicast transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Local address the query socket binds to. Port 0 picks an ephemeral
    /// port, which makes responders reply by unicast.
    pub bind_addr: SocketAddr,

    /// Where queries are sent. Normally the mDNS group and port.
    pub multicast_target: SocketAddr,

    /// Upper bound on a single blocking read, so cancellation is noticed
    /// promptly even when the network is silent.
    pub poll_interval: Duration,

    /// IPv4 multicast TTL for outgoing queries.
    pub multicast_ttl: u32,
}

impl Default for TransportConfig {
    /// | Field            | Default             |
    /// |------------------|---------------------|
    /// | bind_addr        | `0.0.0.0:0`         |
    /// | multicast_target | `224.0.0.251:5353`  |
    /// | poll_interval    | 250 ms              |
    /// | multicast_ttl    | 255                 |
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            multicast_target: SocketAddr::new(IpAddr::V4(MDNS_IPV4_GROUP), MDNS_PORT),
            poll_interval: Duration::from_millis(250),
            multicast_ttl: 255,
        }
    }
}

/// Settings for the HTTP confirmation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationConfig {
    pub path: String,
    pub identity_header: String,

    /// Per-request timeout; kept well below the discovery window.
    pub timeout: Duration,

    /// How many candidates are probed at once. 1 means strictly sequential.
    pub max_concurrent: usize,

    /// Added to the discovery window to form the single deadline shared by
    /// every probe of a run. Probes still pending at that point are dropped.
    pub deadline_margin: Duration,

    /// Accept self-signed certificates on the secure port.
    pub accept_invalid_certs: bool,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_VERIFY_PATH.to_string(),
            identity_header: DEFAULT_IDENTITY_HEADER.to_string(),
            timeout: Duration::from_secs(2),
            max_concurrent: 1,
            deadline_margin: DEFAULT_VERIFY_MARGIN,
            accept_invalid_certs: false,
        }
    }
}

/// All configuration for one discovery run.
///
/// # Example
///
/// ```rust
/// use hub_discovery::domain::DiscoveryConfig;
///
/// let cfg = DiscoveryConfig::default();
/// assert_eq!(cfg.transport.multicast_target.port(), 5353);
/// assert_eq!(cfg.service_types.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub transport: TransportConfig,
    /// DNS-SD service types to browse, queried in this order.
    pub service_types: Vec<String>,
    pub verification: VerificationConfig,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            service_types: DEFAULT_SERVICE_TYPES.iter().map(|s| s.to_string()).collect(),
            verification: VerificationConfig::default(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
