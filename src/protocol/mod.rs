//! Protocol Module
//!
//! Defines the Topic wire protocol: one text query in, one typed payload out.
//!
//! ## Request Format
//! ```text
//! ┌─────────┬──────────┬──────────────┬─────────┬──────────────┬─────────┐
//! │ 0x00    │ 0x83     │ len(q)+6 BE  │ 0x00 x5 │  ?query      │ 0x00    │
//! └─────────┴──────────┴──────────────┴─────────┴──────────────┴─────────┘
//! ```
//!
//! ## Response Format
//! ```text
//! ┌─────────┬──────────┬──────────────┬─────────┬─────────────────────────┐
//! │ 0x00    │ 0x83     │ declared BE  │ Tag (1) │ Payload (adjusted len)  │
//! └─────────┴──────────┴──────────────┴─────────┴─────────────────────────┘
//! ```
//!
//! ### Type Tags
//! - 0x06: STRING - `key=value&...`, payload = declared - 2
//! - 0x2A: FLOAT  - little-endian f32, payload = declared - 1
//! - else: RAW    - opaque bytes, payload = declared

mod codec;
mod query;
mod response;

pub use codec::{
    decode_header, encode_request, encode_response_header, parse_declared_size,
    request_payload_len, RequestPacket, ResponseHeader, DECLARED_SIZE_OVERHEAD,
    MAX_DECLARED_SIZE, PACKET_ID, REQUEST_HEADER_SIZE, RESPONSE_HEADER_SIZE,
};
pub use query::{Query, QUERY_PREFIX};
pub use response::{
    decode_payload, parse_fields, resolve, DecodedResponse, Fields, ResponseKind,
    FLOAT_PAYLOAD_LEN, TAG_FLOAT, TAG_STRING,
};
