//! Hub candidate domain entity.
//!
//! A candidate is one network location that *claims*, through its multicast
//! DNS advertisement, to be a hub. It only becomes useful to the caller after
//! an independent HTTP check confirms the claim.

use std::fmt;
use std::net::Ipv6Addr;

use thiserror::Error;

/// The only port on which a hub is reached over TLS.
pub const SECURE_PORT: u16 = 443;

/// URL scheme used to reach a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// `https` on [`SECURE_PORT`], `http` everywhere else.
    pub fn for_port(port: u16) -> Self {
        if port == SECURE_PORT {
            Scheme::Https
        } else {
            Scheme::Http
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a candidate cannot be constructed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CandidateError {
    #[error("candidate host is empty")]
    EmptyHost,

    #[error("candidate port is zero")]
    ZeroPort,
}

/// Optional facts a hub advertises about itself.
///
/// Every field is `None` when the advertisement left it out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HubAttributes {
    /// Hub identifier from the `id` TXT key.
    pub hub_id: Option<String>,
    /// Friendly name from the `name` TXT key.
    pub name: Option<String>,
    /// Hardware model from the `model` TXT key.
    pub model: Option<String>,
    /// Firmware version from the `version` TXT key.
    pub version: Option<String>,
    /// Service instance name from the PTR record, without the trailing dot.
    pub instance_label: Option<String>,
}

/// A possible hub location assembled from one multicast DNS response.
///
/// The address is derived once in [`Candidate::new`] and can never disagree
/// with `host` and `port`. The only change a candidate undergoes after
/// construction is [`Candidate::with_verified_hub_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    address: String,
    host: String,
    port: u16,
    hub_id: Option<String>,
    name: Option<String>,
    model: Option<String>,
    version: Option<String>,
    instance_label: Option<String>,
}

impl Candidate {
    /// Builds a candidate and derives its address.
    ///
    /// IPv6 literals are bracketed inside the address so it stays a valid
    /// URL; `host` keeps the bare literal.
    ///
    /// # Errors
    ///
    /// Returns [`CandidateError::EmptyHost`] if `host` is empty and
    /// [`CandidateError::ZeroPort`] if `port` is 0.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hub_core::{Candidate, HubAttributes};
    ///
    /// let c = Candidate::new("10.0.0.5", 443, HubAttributes::default()).unwrap();
    /// assert_eq!(c.address(), "https://10.0.0.5:443");
    /// ```
    pub fn new(
        host: impl Into<String>,
        port: u16,
        attributes: HubAttributes,
    ) -> Result<Self, CandidateError> {
        let host = host.into();
        if host.is_empty() {
            return Err(CandidateError::EmptyHost);
        }
        if port == 0 {
            return Err(CandidateError::ZeroPort);
        }

        let scheme = Scheme::for_port(port);
        let address = if host.parse::<Ipv6Addr>().is_ok() {
            format!("{scheme}://[{host}]:{port}")
        } else {
            format!("{scheme}://{host}:{port}")
        };

        Ok(Self {
            address,
            host,
            port,
            hub_id: attributes.hub_id,
            name: attributes.name,
            model: attributes.model,
            version: attributes.version,
            instance_label: attributes.instance_label,
        })
    }

    /// Replaces the hub identifier with the one reported by the hub itself.
    pub fn with_verified_hub_id(mut self, hub_id: impl Into<String>) -> Self {
        self.hub_id = Some(hub_id.into());
        self
    }

    /// `scheme://host:port`; also the deduplication key.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn scheme(&self) -> Scheme {
        Scheme::for_port(self.port)
    }

    pub fn hub_id(&self) -> Option<&str> {
        self.hub_id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn instance_label(&self) -> Option<&str> {
        self.instance_label.as_deref()
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
