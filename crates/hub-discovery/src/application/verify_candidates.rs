//! Confirms that each discovered candidate really is a hub.
//!
//! An mDNS advertisement is only a claim. Before a candidate is handed to
//! the caller the hub must answer an HTTP health check and identify itself;
//! candidates that do not are dropped silently (a debug log line records
//! why).
//!
//! The probe itself is the [`HubProbe`] trait so this policy can be tested
//! without a network. The HTTP implementation lives in
//! `infrastructure::network::health_check`.

use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use hub_core::Candidate;
use thiserror::Error;
use tokio::time::{timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Why a probe did not confirm a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// Transport failure or timeout.
    #[error("request failed: {0}")]
    Unreachable(String),

    /// The endpoint answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// Success status, but the identity header was missing or empty.
    #[error("identity header missing or empty")]
    MissingIdentity,
}

/// Result of probing one candidate address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The hub answered and reported this identifier.
    Confirmed { hub_id: String },
    Rejected(RejectReason),
}

/// Checks whether a hub answers at a given address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HubProbe: Send + Sync {
    /// Probes `address` (`scheme://host:port`). Never fails; every problem
    /// is a [`ProbeOutcome::Rejected`].
    async fn probe(&self, address: &str) -> ProbeOutcome;
}

/// Probes `candidates` and returns the confirmed ones.
///
/// Confirmed candidates have their hub id replaced by the identifier the hub
/// reported. At most `max_concurrent` probes run at once (values below 1 are
/// treated as 1, i.e. sequential), and the result always keeps the input
/// order.
///
/// Every probe shares one outer `deadline`. A probe still running when it
/// passes is abandoned, and candidates not yet probed by then are dropped
/// without a request. Once `cancel` fires the same happens immediately.
pub async fn verify_candidates<P>(
    probe: &P,
    candidates: Vec<Candidate>,
    max_concurrent: usize,
    deadline: Instant,
    cancel: &CancellationToken,
) -> Vec<Candidate>
where
    P: HubProbe + ?Sized,
{
    let checked: Vec<Option<Candidate>> = stream::iter(candidates)
        .map(|candidate| verify_one(probe, candidate, deadline, cancel))
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    checked.into_iter().flatten().collect()
}

async fn verify_one<P>(
    probe: &P,
    candidate: Candidate,
    deadline: Instant,
    cancel: &CancellationToken,
) -> Option<Candidate>
where
    P: HubProbe + ?Sized,
{
    if cancel.is_cancelled() || Instant::now() >= deadline {
        debug!("skipping {candidate}: verification deadline passed or run cancelled");
        return None;
    }

    let outcome = tokio::select! {
        _ = cancel.cancelled() => {
            debug!("verification of {candidate} cancelled");
            return None;
        }
        result = timeout_at(deadline, probe.probe(candidate.address())) => match result {
            Ok(outcome) => outcome,
            Err(_) => {
                debug!("verification of {candidate} cut off at the run deadline");
                return None;
            }
        },
    };

    match outcome {
        ProbeOutcome::Confirmed { hub_id } => {
            debug!("confirmed hub {hub_id} at {candidate}");
            Some(candidate.with_verified_hub_id(hub_id))
        }
        ProbeOutcome::Rejected(reason) => {
            debug!("dropping {candidate}: {reason}");
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use hub_core::HubAttributes;
    use mockall::predicate::eq;

    fn candidate(host: &str, port: u16, advertised_id: Option<&str>) -> Candidate {
        let attrs = HubAttributes {
            hub_id: advertised_id.map(str::to_string),
            ..HubAttributes::default()
        };
        Candidate::new(host, port, attrs).expect("valid candidate")
    }

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    fn confirmed(id: &str) -> ProbeOutcome {
        ProbeOutcome::Confirmed {
            hub_id: id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_confirmed_candidate_takes_header_id() {
        // Arrange
        let mut probe = MockHubProbe::new();
        probe
            .expect_probe()
            .with(eq("http://10.0.0.1:80"))
            .times(1)
            .returning(|_| confirmed("from-header"));
        let input = vec![candidate("10.0.0.1", 80, Some("from-txt"))];

        // Act
        let verified =
            verify_candidates(&probe, input, 1, far_deadline(), &CancellationToken::new()).await;

        // Assert
        assert_eq!(verified.len(), 1);
        assert_eq!(verified[0].hub_id(), Some("from-header"));
    }

    #[tokio::test]
    async fn test_every_rejection_reason_drops_candidate() {
        // Arrange
        let mut probe = MockHubProbe::new();
        probe
            .expect_probe()
            .with(eq("http://10.0.0.1:80"))
            .returning(|_| ProbeOutcome::Rejected(RejectReason::Status(500)));
        probe
            .expect_probe()
            .with(eq("http://10.0.0.2:80"))
            .returning(|_| ProbeOutcome::Rejected(RejectReason::MissingIdentity));
        probe
            .expect_probe()
            .with(eq("http://10.0.0.3:80"))
            .returning(|_| ProbeOutcome::Rejected(RejectReason::Unreachable("refused".into())));
        let input = vec![
            candidate("10.0.0.1", 80, None),
            candidate("10.0.0.2", 80, None),
            candidate("10.0.0.3", 80, None),
        ];

        // Act
        let verified =
            verify_candidates(&probe, input, 1, far_deadline(), &CancellationToken::new()).await;

        // Assert
        assert!(verified.is_empty());
    }

    #[tokio::test]
    async fn test_mixed_results_keep_collection_order() {
        // Arrange
        let mut probe = MockHubProbe::new();
        probe
            .expect_probe()
            .with(eq("http://10.0.0.1:80"))
            .returning(|_| confirmed("one"));
        probe
            .expect_probe()
            .with(eq("https://10.0.0.2:443"))
            .returning(|_| ProbeOutcome::Rejected(RejectReason::Status(404)));
        probe
            .expect_probe()
            .with(eq("http://10.0.0.3:80"))
            .returning(|_| confirmed("three"));
        let input = vec![
            candidate("10.0.0.1", 80, None),
            candidate("10.0.0.2", 443, None),
            candidate("10.0.0.3", 80, None),
        ];

        // Act
        let verified =
            verify_candidates(&probe, input, 3, far_deadline(), &CancellationToken::new()).await;

        // Assert
        let ids: Vec<_> = verified.iter().map(|c| c.hub_id()).collect();
        assert_eq!(ids, vec![Some("one"), Some("three")]);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_probes() {
        let mut probe = MockHubProbe::new();
        probe.expect_probe().never();

        let cancel = CancellationToken::new();
        let verified = verify_candidates(&probe, vec![], 1, far_deadline(), &cancel).await;

        assert!(verified.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_token_skips_all_probes() {
        // Arrange
        let mut probe = MockHubProbe::new();
        probe.expect_probe().never();
        let cancel = CancellationToken::new();
        cancel.cancel();

        // Act
        let input = vec![candidate("10.0.0.1", 80, None)];
        let verified = verify_candidates(&probe, input, 1, far_deadline(), &cancel).await;

        // Assert
        assert!(verified.is_empty());
    }

    /// Probe double that sleeps and tracks how many probes overlap.
    struct SlowProbe {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: Arc<AtomicUsize>,
    }

    impl SlowProbe {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl HubProbe for SlowProbe {
        async fn probe(&self, address: &str) -> ProbeOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            confirmed(address)
        }
    }

    #[tokio::test]
    async fn test_sequential_by_default() {
        // Arrange
        let probe = SlowProbe::new(Duration::from_millis(10));
        let input = (1..=4)
            .map(|i| candidate(&format!("10.0.0.{i}"), 80, None))
            .collect();

        // Act
        let verified =
            verify_candidates(&probe, input, 1, far_deadline(), &CancellationToken::new()).await;

        // Assert
        assert_eq!(verified.len(), 4);
        assert_eq!(probe.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        // Arrange
        let probe = SlowProbe::new(Duration::from_millis(20));
        let input = (1..=6)
            .map(|i| candidate(&format!("10.0.0.{i}"), 80, None))
            .collect();

        // Act
        let verified =
            verify_candidates(&probe, input, 2, far_deadline(), &CancellationToken::new()).await;

        // Assert
        assert_eq!(verified.len(), 6);
        assert!(probe.peak.load(Ordering::SeqCst) <= 2);
        let order: Vec<_> = verified.iter().map(|c| c.host().to_string()).collect();
        assert_eq!(
            order,
            (1..=6).map(|i| format!("10.0.0.{i}")).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_cancel_during_probe_drops_remainder() {
        // Arrange
        let probe = SlowProbe::new(Duration::from_secs(5));
        let calls = Arc::clone(&probe.calls);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.cancel();
        });
        let input = vec![candidate("10.0.0.1", 80, None), candidate("10.0.0.2", 80, None)];

        // Act
        let started = std::time::Instant::now();
        let verified = verify_candidates(&probe, input, 1, far_deadline(), &cancel).await;

        // Assert
        assert!(verified.is_empty());
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shared_deadline_cuts_off_slow_health_checks() {
        // Arrange: three sequential 200 ms checks against a 300 ms deadline.
        let probe = SlowProbe::new(Duration::from_millis(200));
        let calls = Arc::clone(&probe.calls);
        let input = (1..=3)
            .map(|i| candidate(&format!("10.0.0.{i}"), 80, None))
            .collect();
        let deadline = Instant::now() + Duration::from_millis(300);

        // Act
        let started = std::time::Instant::now();
        let verified =
            verify_candidates(&probe, input, 1, deadline, &CancellationToken::new()).await;

        // Assert: the first finishes, the second is cut off, the third never starts.
        assert_eq!(verified.len(), 1);
        assert_eq!(verified[0].host(), "10.0.0.1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() < Duration::from_millis(550));
    }

    #[tokio::test]
    async fn test_past_deadline_makes_no_health_checks() {
        let mut probe = MockHubProbe::new();
        probe.expect_probe().never();
        let input = vec![candidate("10.0.0.1", 80, None)];

        let verified =
            verify_candidates(&probe, input, 1, Instant::now(), &CancellationToken::new()).await;

        assert!(verified.is_empty());
    }
}
