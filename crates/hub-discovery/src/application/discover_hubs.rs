//! Use case: find hubs on the local network and confirm them.
//!
//! One run has two phases:
//!
//! 1. **Collect** – open a fresh transport, send one PTR query per service
//!    type, then decode every reply that arrives before the window closes.
//!    Each reply that yields a candidate goes into a [`CandidateSet`], which
//!    keeps the first candidate per address.
//! 2. **Verify** – probe each collected candidate over HTTP and keep only
//!    those that answer and identify themselves. All probes share one
//!    deadline: the end of the discovery window plus a fixed margin.
//!
//! Only failing to open the transport aborts a run. A send failure, an
//! undecodable datagram, an advertisement without a service location or a
//! failed probe just means fewer results. No replies at all is `Ok(vec![])`.

use std::time::Duration;

use hub_core::{decode_message, extract_candidate, is_response, Candidate, CandidateSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::application::transport::{
    Datagram, DatagramTransport, DiscoveryError, TransportFactory,
};
use crate::application::verify_candidates::{verify_candidates, HubProbe};
use crate::domain::config::{DEFAULT_DISCOVERY_TIMEOUT, DEFAULT_VERIFY_MARGIN};

/// Discovers and verifies hubs.
///
/// Generic over the transport factory and the probe so tests can swap in
/// loopback sockets and scripted probes.
pub struct DiscoverHubsUseCase<F, P> {
    factory: F,
    probe: P,
    service_types: Vec<String>,
    max_concurrent: usize,
    verify_margin: Duration,
}

impl<F, P> DiscoverHubsUseCase<F, P>
where
    F: TransportFactory,
    P: HubProbe,
{
    /// Creates the use case.
    ///
    /// `service_types` are queried in order on every run; `max_concurrent`
    /// bounds parallel verification probes (1 = sequential). The
    /// verification margin starts at [`DEFAULT_VERIFY_MARGIN`].
    pub fn new(factory: F, probe: P, service_types: Vec<String>, max_concurrent: usize) -> Self {
        Self {
            factory,
            probe,
            service_types,
            max_concurrent,
            verify_margin: DEFAULT_VERIFY_MARGIN,
        }
    }

    /// Sets how long verification may run past the end of the discovery
    /// window.
    pub fn with_verification_margin(mut self, margin: Duration) -> Self {
        self.verify_margin = margin;
        self
    }

    /// Runs both phases and returns the confirmed hubs in arrival order.
    ///
    /// A zero `timeout` means [`DEFAULT_DISCOVERY_TIMEOUT`]. The whole run,
    /// verification included, ends at most the verification margin after the
    /// discovery window closes; candidates not confirmed by then are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::BindFailed`] if the transport cannot be
    /// opened. Nothing else is fatal.
    pub async fn discover_and_verify(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candidate>, DiscoveryError> {
        let deadline = Instant::now() + effective_window(timeout) + self.verify_margin;

        let candidates = self.discover(timeout, cancel).await?;
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let collected = candidates.len();
        let verified = verify_candidates(
            &self.probe,
            candidates,
            self.max_concurrent,
            deadline,
            cancel,
        )
        .await;
        info!("{} of {collected} candidate(s) confirmed", verified.len());
        Ok(verified)
    }

    /// Runs the collection phase only and returns unverified candidates.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::BindFailed`] if the transport cannot be
    /// opened.
    pub async fn discover(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candidate>, DiscoveryError> {
        let window = effective_window(timeout);

        let mut transport = self.factory.open().await?;
        let deadline = Instant::now() + window;

        for service_type in &self.service_types {
            if let Err(e) = transport.send_query(service_type).await {
                warn!("{e}");
            }
        }

        let mut found = CandidateSet::new();
        let mut datagrams = transport.receive_until(deadline, cancel);
        while let Some(datagram) = datagrams.next().await {
            collect(&mut found, &datagram);
        }
        drop(datagrams);
        transport.close();

        info!(
            "discovery window of {:?} closed with {} candidate(s)",
            window,
            found.len()
        );
        Ok(found.into_vec())
    }
}

/// The discovery window for a requested `timeout` (zero means the default).
fn effective_window(timeout: Duration) -> Duration {
    if timeout.is_zero() {
        DEFAULT_DISCOVERY_TIMEOUT
    } else {
        timeout
    }
}

/// Decodes one datagram and adds its candidate, if any, to `found`.
fn collect(found: &mut CandidateSet, datagram: &Datagram) {
    let msg = match decode_message(&datagram.payload) {
        Ok(msg) => msg,
        Err(e) => {
            debug!("ignoring undecodable datagram from {}: {e}", datagram.source);
            return;
        }
    };

    if !is_response(&msg) {
        trace!("ignoring query from {}", datagram.source);
        return;
    }

    let Some(candidate) = extract_candidate(&msg) else {
        debug!("response from {} has no usable service location", datagram.source);
        return;
    };

    let address = candidate.address().to_string();
    if found.insert(candidate) {
        debug!("candidate {address} from {}", datagram.source);
    } else {
        trace!("duplicate candidate {address}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
