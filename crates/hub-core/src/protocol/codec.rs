//! Multicast DNS encoding and decoding on top of `hickory-proto`.
//!
//! The wire format itself (RFC 1035 §4.1 plus the RFC 6762 class bits) is
//! handled by `hickory_proto::op::Message`. This module only pins down the
//! shape of the one query discovery sends and maps the crate's errors into
//! [`ProtocolError`], so callers never match on `hickory_proto` error kinds.

use std::net::Ipv4Addr;

use hickory_proto::error::ProtoError;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RecordType};
use thiserror::Error;

// ── Protocol constants ────────────────────────────────────────────────────────

/// IPv4 multicast group used by multicast DNS.
pub const MDNS_IPV4_GROUP: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);

/// UDP port used by multicast DNS.
pub const MDNS_PORT: u16 = 5353;

/// Errors that can occur while building a query or reading a reply.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The service type handed to the encoder is not a usable DNS name.
    #[error("invalid service type {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// The query could not be serialized.
    #[error("failed to encode query: {0}")]
    Encode(#[source] ProtoError),

    /// The datagram is not a well-formed DNS message.
    #[error("failed to decode message: {0}")]
    Decode(#[source] ProtoError),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes the browse query for one DNS-SD service type.
///
/// The message carries a single PTR question of class IN. The
/// recursion-desired flag stays clear and every other section is empty.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidName`] if `service_type` is empty or is
/// not a valid DNS name.
///
/// # Examples
///
/// ```rust
/// use hub_core::protocol::{decode_message, encode_query};
///
/// let bytes = encode_query("_homey._tcp.local.", 7).unwrap();
/// let msg = decode_message(&bytes).unwrap();
/// assert_eq!(msg.id(), 7);
/// assert_eq!(msg.queries()[0].name().to_string(), "_homey._tcp.local.");
/// ```
pub fn encode_query(service_type: &str, id: u16) -> Result<Vec<u8>, ProtocolError> {
    if service_type.trim_end_matches('.').is_empty() {
        return Err(ProtocolError::InvalidName {
            name: service_type.to_string(),
            reason: "service type is empty".to_string(),
        });
    }

    let name = Name::from_ascii(service_type).map_err(|e| ProtocolError::InvalidName {
        name: service_type.to_string(),
        reason: e.to_string(),
    })?;

    let mut msg = Message::new();
    msg.set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(false)
        .add_query(Query::query(name, RecordType::PTR));

    msg.to_vec().map_err(ProtocolError::Encode)
}

/// Decodes one datagram into a [`Message`].
///
/// # Errors
///
/// Returns [`ProtocolError::Decode`] if the datagram is truncated, holds a
/// malformed or looping name, or has record data that does not fit its type.
pub fn decode_message(bytes: &[u8]) -> Result<Message, ProtocolError> {
    Message::from_vec(bytes).map_err(ProtocolError::Decode)
}

/// Returns `true` if `msg` is a response (QR bit set).
pub fn is_response(msg: &Message) -> bool {
    msg.message_type() == MessageType::Response
}

// ── Tests ─────────────────────────────────────────────────────────────────────
