//! TOML configuration file for the `hub-discover` binary.
//!
//! Read from the platform-appropriate location, or from `--config <path>`:
//! - Windows:  `%APPDATA%\HubDiscover\config.toml`
//! - Linux:    `~/.config/hub-discover/config.toml`
//! - macOS:    `~/Library/Application Support/HubDiscover/config.toml`
//!
//! Every field is optional. A missing file, a missing section or a missing
//! key all fall back to the built-in defaults:
//!
//! ```toml
//! [discovery]
//! timeout_secs = 5
//! service_types = ["_homey._tcp.local.", "_athom._tcp.local."]
//! multicast_addr = "224.0.0.251:5353"
//! bind_addr = "0.0.0.0:0"
//! poll_interval_ms = 250
//!
//! [verification]
//! path = "/api/manager/system/ping"
//! identity_header = "X-Homey-ID"
//! timeout_ms = 2000
//! max_concurrent = 1
//! deadline_margin_ms = 2000
//! accept_invalid_certs = false
//!
//! [output]
//! format = "json"
//! ```
//!
//! The library never reads this file; [`AppConfig::to_discovery_config`]
//! converts it into the plain [`DiscoveryConfig`] the use case takes.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::config::{
    DiscoveryConfig, TransportConfig, VerificationConfig, DEFAULT_DISCOVERY_TIMEOUT,
    DEFAULT_IDENTITY_HEADER, DEFAULT_SERVICE_TYPES, DEFAULT_VERIFY_MARGIN, DEFAULT_VERIFY_PATH,
};
use crate::infrastructure::console::OutputFormat;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but makes no sense (e.g. an unparseable address).
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub discovery: DiscoverySection,
    #[serde(default)]
    pub verification: VerificationSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// `[discovery]`: the multicast phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoverySection {
    /// Listening window in seconds. 0 means the default of 5.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Service types to browse, in query order.
    #[serde(default = "default_service_types")]
    pub service_types: Vec<String>,
    /// Destination of browse queries, `ip:port`.
    #[serde(default = "default_multicast_addr")]
    pub multicast_addr: String,
    /// Local bind address, `ip:port`. Port 0 is ephemeral.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_multicast_ttl")]
    pub multicast_ttl: u32,
}

/// `[verification]`: the HTTP confirmation phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationSection {
    #[serde(default = "default_verify_path")]
    pub path: String,
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
    #[serde(default = "default_verify_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// How long probes may run after the discovery window closes.
    #[serde(default = "default_deadline_margin_ms")]
    pub deadline_margin_ms: u64,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

/// `[output]`: how results are printed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputSection {
    #[serde(default)]
    pub format: OutputFormat,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_timeout_secs() -> u64 {
    DEFAULT_DISCOVERY_TIMEOUT.as_secs()
}
fn default_service_types() -> Vec<String> {
    DEFAULT_SERVICE_TYPES.iter().map(|s| s.to_string()).collect()
}
fn default_multicast_addr() -> String {
    TransportConfig::default().multicast_target.to_string()
}
fn default_bind_addr() -> String {
    TransportConfig::default().bind_addr.to_string()
}
fn default_poll_interval_ms() -> u64 {
    250
}
fn default_multicast_ttl() -> u32 {
    255
}
fn default_verify_path() -> String {
    DEFAULT_VERIFY_PATH.to_string()
}
fn default_identity_header() -> String {
    DEFAULT_IDENTITY_HEADER.to_string()
}
fn default_verify_timeout_ms() -> u64 {
    2000
}
fn default_max_concurrent() -> usize {
    1
}
fn default_deadline_margin_ms() -> u64 {
    DEFAULT_VERIFY_MARGIN.as_millis() as u64
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            service_types: default_service_types(),
            multicast_addr: default_multicast_addr(),
            bind_addr: default_bind_addr(),
            poll_interval_ms: default_poll_interval_ms(),
            multicast_ttl: default_multicast_ttl(),
        }
    }
}

impl Default for VerificationSection {
    fn default() -> Self {
        Self {
            path: default_verify_path(),
            identity_header: default_identity_header(),
            timeout_ms: default_verify_timeout_ms(),
            max_concurrent: default_max_concurrent(),
            deadline_margin_ms: default_deadline_margin_ms(),
            accept_invalid_certs: false,
        }
    }
}

impl AppConfig {
    /// Converts the file representation into a validated [`DiscoveryConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an address does not parse, the
    /// service list is empty, or the verification timeout is zero.
    pub fn to_discovery_config(&self) -> Result<DiscoveryConfig, ConfigError> {
        let d = &self.discovery;
        let v = &self.verification;

        if d.service_types.is_empty() {
            return Err(ConfigError::Invalid {
                field: "discovery.service_types",
                reason: "at least one service type is required".to_string(),
            });
        }
        if v.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "verification.timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(DiscoveryConfig {
            transport: TransportConfig {
                bind_addr: parse_addr("discovery.bind_addr", &d.bind_addr)?,
                multicast_target: parse_addr("discovery.multicast_addr", &d.multicast_addr)?,
                poll_interval: Duration::from_millis(d.poll_interval_ms.max(1)),
                multicast_ttl: d.multicast_ttl,
            },
            service_types: d.service_types.clone(),
            verification: VerificationConfig {
                path: v.path.clone(),
                identity_header: v.identity_header.clone(),
                timeout: Duration::from_millis(v.timeout_ms),
                max_concurrent: v.max_concurrent.max(1),
                deadline_margin: Duration::from_millis(v.deadline_margin_ms),
                accept_invalid_certs: v.accept_invalid_certs,
            },
        })
    }
}

fn parse_addr(field: &'static str, value: &str) -> Result<SocketAddr, ConfigError> {
    value.parse().map_err(|e| ConfigError::Invalid {
        field,
        reason: format!("{value:?}: {e}"),
    })
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the config from the platform location, returning defaults if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads the config from `path`, returning defaults if the file does not exist.
///
/// # Errors
///
/// Same as [`load_config`].
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Resolves the platform config directory for this tool.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("HubDiscover"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("hub-discover"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("HubDiscover")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
