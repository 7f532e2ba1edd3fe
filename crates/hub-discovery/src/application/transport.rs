//! Transport port for the discovery use case.
//!
//! The use case never touches a socket directly. It asks a
//! [`TransportFactory`] for a fresh [`DatagramTransport`] on every run, sends
//! one query per service type, then drains [`Datagrams`] until the window
//! closes.
//!
//! [`Datagrams`] owns the timing rules so every transport gets them for free:
//!
//! - the sequence ends (without error) when the deadline passes;
//! - a single read never waits longer than the transport's poll interval,
//!   so the cancellation token is re-checked at least that often;
//! - a failed read is logged and skipped rather than ending the sequence.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use hub_core::ProtocolError;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// The only fatal error of a discovery run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The query socket could not be bound.
    #[error("failed to bind discovery socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// Failure to send one query. The use case logs it and moves on.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to encode query for {service_type}: {source}")]
    Encode {
        service_type: String,
        #[source]
        source: ProtocolError,
    },

    #[error("failed to send query to {target}: {source}")]
    Send {
        target: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// One received datagram and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub payload: Vec<u8>,
    pub source: SocketAddr,
}

/// A bound socket able to send browse queries and read replies.
#[async_trait]
pub trait DatagramTransport: Send {
    /// Encodes and sends the PTR query for `service_type`. Never retried.
    async fn send_query(&mut self, service_type: &str) -> Result<(), TransportError>;

    /// Waits at most `wait` for one datagram.
    ///
    /// Returns `Ok(None)` when nothing arrived in time.
    async fn recv_within(&mut self, wait: Duration) -> io::Result<Option<Datagram>>;

    /// Longest single wait [`Datagrams`] will ask for.
    fn poll_interval(&self) -> Duration;

    /// Returns the lazy, finite sequence of datagrams arriving before
    /// `deadline`.
    fn receive_until<'a>(
        &'a mut self,
        deadline: Instant,
        cancel: &'a CancellationToken,
    ) -> Datagrams<'a, Self>
    where
        Self: Sized,
    {
        Datagrams::new(self, deadline, cancel)
    }

    /// Releases the socket.
    fn close(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}

/// Opens a fresh transport for each discovery run.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    type Transport: DatagramTransport;

    /// # Errors
    ///
    /// Returns [`DiscoveryError::BindFailed`] if no socket could be bound.
    async fn open(&self) -> Result<Self::Transport, DiscoveryError>;
}

/// Datagrams received before a deadline; see the module docs.
///
/// Once [`Datagrams::next`] has returned `None` it keeps returning `None`.
pub struct Datagrams<'a, T: ?Sized> {
    transport: &'a mut T,
    deadline: Instant,
    cancel: &'a CancellationToken,
    finished: bool,
}

impl<'a, T: DatagramTransport + ?Sized> Datagrams<'a, T> {
    pub fn new(transport: &'a mut T, deadline: Instant, cancel: &'a CancellationToken) -> Self {
        Self {
            transport,
            deadline,
            cancel,
            finished: false,
        }
    }

    /// Waits for the next datagram, or returns `None` once the deadline has
    /// passed or the token is cancelled.
    pub async fn next(&mut self) -> Option<Datagram> {
        while !self.finished {
            if self.cancel.is_cancelled() {
                debug!("receive loop cancelled");
                self.finished = true;
                break;
            }

            let now = Instant::now();
            if now >= self.deadline {
                self.finished = true;
                break;
            }
            let wait = (self.deadline - now).min(self.transport.poll_interval());

            match self.transport.recv_within(wait).await {
                Ok(Some(datagram)) => return Some(datagram),
                Ok(None) => {}
                Err(e) => {
                    debug!("skipping failed read: {e}");
                    // A socket that fails without blocking must not spin.
                    tokio::select! {
                        _ = self.cancel.cancelled() => {}
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
            }
        }
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted transport: replays queued read results, then sleeps for the
    /// requested wait and reports a timeout.
    struct ScriptedTransport {
        script: VecDeque<io::Result<Option<Datagram>>>,
        waits: Vec<Duration>,
        poll: Duration,
    }

    impl ScriptedTransport {
        fn new(script: Vec<io::Result<Option<Datagram>>>, poll: Duration) -> Self {
            Self {
                script: script.into(),
                waits: Vec::new(),
                poll,
            }
        }
    }

    #[async_trait]
    impl DatagramTransport for ScriptedTransport {
        async fn send_query(&mut self, _service_type: &str) -> Result<(), TransportError> {
            Ok(())
        }

        async fn recv_within(&mut self, wait: Duration) -> io::Result<Option<Datagram>> {
            self.waits.push(wait);
            match self.script.pop_front() {
                Some(result) => result,
                None => {
                    tokio::time::sleep(wait).await;
                    Ok(None)
                }
            }
        }

        fn poll_interval(&self) -> Duration {
            self.poll
        }
    }

    fn datagram(byte: u8) -> Datagram {
        Datagram {
            payload: vec![byte],
            source: "127.0.0.1:5353".parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_yields_datagrams_then_ends_at_deadline() {
        // Arrange
        let mut transport = ScriptedTransport::new(
            vec![Ok(Some(datagram(1))), Ok(Some(datagram(2)))],
            Duration::from_millis(10),
        );
        let cancel = CancellationToken::new();
        let deadline = Instant::now() + Duration::from_millis(60);

        // Act
        let mut received = Vec::new();
        let mut datagrams = transport.receive_until(deadline, &cancel);
        while let Some(d) = datagrams.next().await {
            received.push(d.payload[0]);
        }

        // Assert
        assert_eq!(received, vec![1, 2]);
        assert!(Instant::now() >= deadline);
    }

    #[tokio::test]
    async fn test_read_errors_are_skipped() {
        // Arrange
        let mut transport = ScriptedTransport::new(
            vec![
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "icmp")),
                Ok(Some(datagram(7))),
            ],
            Duration::from_millis(10),
        );
        let cancel = CancellationToken::new();
        let deadline = Instant::now() + Duration::from_millis(40);

        // Act
        let mut datagrams = transport.receive_until(deadline, &cancel);
        let first = datagrams.next().await;

        // Assert
        assert_eq!(first, Some(datagram(7)));
    }

    /// Transport whose every read fails at once.
    struct FailingTransport {
        reads: usize,
    }

    #[async_trait]
    impl DatagramTransport for FailingTransport {
        async fn send_query(&mut self, _service_type: &str) -> Result<(), TransportError> {
            Ok(())
        }

        async fn recv_within(&mut self, _wait: Duration) -> io::Result<Option<Datagram>> {
            self.reads += 1;
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
        }

        fn poll_interval(&self) -> Duration {
            Duration::from_millis(20)
        }
    }

    #[tokio::test]
    async fn test_immediate_read_failures_wait_a_poll_before_retrying() {
        // Arrange
        let mut transport = FailingTransport { reads: 0 };
        let cancel = CancellationToken::new();
        let deadline = Instant::now() + Duration::from_millis(100);

        // Act
        {
            let mut datagrams = transport.receive_until(deadline, &cancel);
            assert!(datagrams.next().await.is_none());
        }

        // Assert: one read per 20 ms slice, not a busy loop.
        assert!(transport.reads >= 2, "reads = {}", transport.reads);
        assert!(transport.reads <= 8, "reads = {}", transport.reads);
        assert!(Instant::now() >= deadline);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_wait_after_failed_read() {
        // Arrange
        let mut transport = FailingTransport { reads: 0 };
        let cancel = CancellationToken::new();
        let deadline = Instant::now() + Duration::from_secs(10);
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.cancel();
        });

        // Act
        let started = Instant::now();
        let mut datagrams = transport.receive_until(deadline, &cancel);
        let result = datagrams.next().await;

        // Assert
        assert!(result.is_none());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_single_wait_is_bounded_by_poll_interval() {
        // Arrange
        let mut transport = ScriptedTransport::new(vec![], Duration::from_millis(5));
        let cancel = CancellationToken::new();
        let deadline = Instant::now() + Duration::from_millis(30);

        // Act
        {
            let mut datagrams = transport.receive_until(deadline, &cancel);
            while datagrams.next().await.is_some() {}
        }

        // Assert
        assert!(transport.waits.len() > 1, "window must be sliced");
        assert!(transport
            .waits
            .iter()
            .all(|w| *w <= Duration::from_millis(5)));
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_ends_immediately() {
        // Arrange
        let mut transport =
            ScriptedTransport::new(vec![Ok(Some(datagram(1)))], Duration::from_millis(10));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let deadline = Instant::now() + Duration::from_secs(5);

        // Act
        let started = Instant::now();
        let mut datagrams = transport.receive_until(deadline, &cancel);
        let first = datagrams.next().await;

        // Assert
        assert!(first.is_none());
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(transport.waits.is_empty(), "no read after cancellation");
    }

    #[tokio::test]
    async fn test_cancel_mid_window_stops_within_one_poll() {
        // Arrange
        let mut transport = ScriptedTransport::new(vec![], Duration::from_millis(20));
        let cancel = CancellationToken::new();
        let deadline = Instant::now() + Duration::from_secs(10);
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        // Act
        let started = Instant::now();
        let mut datagrams = transport.receive_until(deadline, &cancel);
        let result = datagrams.next().await;

        // Assert
        assert!(result.is_none());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_finished_sequence_stays_finished() {
        // Arrange
        let mut transport = ScriptedTransport::new(vec![], Duration::from_millis(5));
        let cancel = CancellationToken::new();
        let deadline = Instant::now();

        // Act
        let mut datagrams = transport.receive_until(deadline, &cancel);
        let first = datagrams.next().await;
        let second = datagrams.next().await;

        // Assert
        assert!(first.is_none());
        assert!(second.is_none());
    }
}
