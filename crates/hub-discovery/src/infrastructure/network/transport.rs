//! UDP multicast transport for browse queries.
//!
//! One socket per discovery run, bound to an ephemeral port. Queries go to
//! the multicast group; because the source port is not 5353, responders
//! answer by unicast straight back to this socket, so no group membership
//! is needed.
//!
//! # Where do the answers come from? (for beginners)
//!
//! Multicast DNS has no server. A query sent to `224.0.0.251:5353` reaches
//! every host on the link, and each host that owns a matching service
//! replies on its own. The replies arrive as separate datagrams in no
//! particular order, some of them duplicates, and there is no "last answer"
//! marker. The only way to know you are done is to stop listening after a
//! fixed window, which is what [`Datagrams`] does.
//!
//! [`Datagrams`]: crate::application::transport::Datagrams

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use hub_core::encode_query;
use hub_core::protocol::QueryIdCounter;
use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::application::transport::{
    Datagram, DatagramTransport, DiscoveryError, TransportError, TransportFactory,
};
use crate::domain::config::TransportConfig;

/// Largest datagram we are prepared to read.
const RECV_BUFFER_SIZE: usize = 65_535;

/// A bound UDP socket sending browse queries to a fixed target.
pub struct MulticastTransport {
    socket: UdpSocket,
    target: SocketAddr,
    poll_interval: Duration,
    ids: QueryIdCounter,
    buf: Vec<u8>,
}

impl MulticastTransport {
    /// Binds the query socket described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::BindFailed`] if the socket cannot be bound.
    pub async fn open(config: &TransportConfig) -> Result<Self, DiscoveryError> {
        let addr = config.bind_addr;
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| DiscoveryError::BindFailed { addr, source })?;

        if addr.is_ipv4() && config.multicast_target.ip().is_multicast() {
            if let Err(e) = socket.set_multicast_ttl_v4(config.multicast_ttl) {
                debug!("could not set multicast TTL: {e}");
            }
        }

        match socket.local_addr() {
            Ok(local) => info!("discovery socket bound on {local}"),
            Err(_) => info!("discovery socket bound on {addr}"),
        }

        Ok(Self {
            socket,
            target: config.multicast_target,
            poll_interval: config.poll_interval,
            ids: QueryIdCounter::new(),
            buf: vec![0u8; RECV_BUFFER_SIZE],
        })
    }

    /// The address the socket actually bound to.
    ///
    /// # Errors
    ///
    /// Propagates the OS error if the address cannot be read.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

#[async_trait]
impl DatagramTransport for MulticastTransport {
    async fn send_query(&mut self, service_type: &str) -> Result<(), TransportError> {
        let bytes = encode_query(service_type, self.ids.next()).map_err(|source| {
            TransportError::Encode {
                service_type: service_type.to_string(),
                source,
            }
        })?;

        self.socket
            .send_to(&bytes, self.target)
            .await
            .map_err(|source| TransportError::Send {
                target: self.target,
                source,
            })?;

        debug!("sent PTR query for {service_type} to {}", self.target);
        Ok(())
    }

    async fn recv_within(&mut self, wait: Duration) -> io::Result<Option<Datagram>> {
        match tokio::time::timeout(wait, self.socket.recv_from(&mut self.buf)).await {
            Err(_elapsed) => Ok(None),
            Ok(Ok((len, source))) => Ok(Some(Datagram {
                payload: self.buf[..len].to_vec(),
                source,
            })),
            Ok(Err(e)) if is_timeout_error(&e) => Ok(None),
            Ok(Err(e)) => Err(e),
        }
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

/// Opens a [`MulticastTransport`] per discovery run.
#[derive(Debug, Clone)]
pub struct MulticastTransportFactory {
    config: TransportConfig,
}

impl MulticastTransportFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TransportFactory for MulticastTransportFactory {
    type Transport = MulticastTransport;

    async fn open(&self) -> Result<MulticastTransport, DiscoveryError> {
        MulticastTransport::open(&self.config).await
    }
}

/// Returns `true` for OS timeout / would-block errors that should be retried.
fn is_timeout_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
