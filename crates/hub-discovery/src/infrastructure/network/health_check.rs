//! HTTP health check confirming that a candidate is a hub.
//!
//! `GET {address}{path}` with a short timeout. A hub answers with a success
//! status and its identifier in a response header; anything else (timeout,
//! refused connection, TLS failure, error status, missing header) rejects
//! the candidate.

use async_trait::async_trait;
use reqwest::header::HeaderName;
use thiserror::Error;

use crate::application::verify_candidates::{HubProbe, ProbeOutcome, RejectReason};
use crate::domain::config::VerificationConfig;

/// Failure to build the probe from configuration.
#[derive(Debug, Error)]
pub enum HealthCheckError {
    #[error("invalid identity header name {0:?}")]
    InvalidHeaderName(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// [`HubProbe`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpHubProbe {
    client: reqwest::Client,
    path: String,
    identity_header: HeaderName,
}

impl HttpHubProbe {
    /// Builds a probe with the timeout, path and header from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HealthCheckError::InvalidHeaderName`] if the configured
    /// header is not a valid HTTP header name, or
    /// [`HealthCheckError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &VerificationConfig) -> Result<Self, HealthCheckError> {
        let identity_header = HeaderName::from_bytes(config.identity_header.as_bytes())
            .map_err(|_| HealthCheckError::InvalidHeaderName(config.identity_header.clone()))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        let path = if config.path.starts_with('/') {
            config.path.clone()
        } else {
            format!("/{}", config.path)
        };

        Ok(Self {
            client,
            path,
            identity_header,
        })
    }

    fn url_for(&self, address: &str) -> String {
        format!("{}{}", address.trim_end_matches('/'), self.path)
    }
}

#[async_trait]
impl HubProbe for HttpHubProbe {
    async fn probe(&self, address: &str) -> ProbeOutcome {
        let url = self.url_for(address);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return ProbeOutcome::Rejected(RejectReason::Unreachable(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            return ProbeOutcome::Rejected(RejectReason::Status(status.as_u16()));
        }

        let hub_id = response
            .headers()
            .get(&self.identity_header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match hub_id {
            Some(hub_id) => ProbeOutcome::Confirmed {
                hub_id: hub_id.to_string(),
            },
            None => ProbeOutcome::Rejected(RejectReason::MissingIdentity),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
