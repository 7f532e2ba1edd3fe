pub mod codec;
pub mod query_id;

pub use codec::{
    decode_message, encode_query, is_response, ProtocolError, MDNS_IPV4_GROUP, MDNS_PORT,
};
pub use query_id::QueryIdCounter;
