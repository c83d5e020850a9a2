//! Protocol codec
//!
//! Encoding of request frames and decoding of response headers.
//!
//! ## Wire Format
//!
//! ### Request Frame
//! ```text
//! ┌─────────┬─────────┬──────────────┬─────────┬──────────────┬──────────┐
//! │ Pad (1) │ Id (1)  │ DeclSize (2) │ Pad (5) │    Query     │ NUL (1)  │
//! └─────────┴─────────┴──────────────┴─────────┴──────────────┴──────────┘
//! ```
//!
//! ### Response Header
//! ```text
//! ┌─────────┬─────────┬──────────────┬─────────┐
//! │ Pad (1) │ Id (1)  │ DeclLen (2)  │ Tag (1) │
//! └─────────┴─────────┴──────────────┴─────────┘
//! ```
//!
//! Header integers are big-endian. Neither declared field is the literal
//! byte count of what follows; see [`DECLARED_SIZE_OVERHEAD`] and
//! [`resolve`](super::resolve).

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{resolve, Query, ResponseKind};
use crate::error::{ProtocolError, Result};

/// Marker byte identifying a Topic frame, in both directions
pub const PACKET_ID: u8 = 0x83;

/// Request header size: pad + id + declared size + 5 pad bytes
pub const REQUEST_HEADER_SIZE: usize = 9;

/// Response header size: pad + id + declared length + type tag
pub const RESPONSE_HEADER_SIZE: usize = 5;

/// Zero bytes between the declared size and the query
const REQUEST_PAD_LEN: usize = 5;

/// Added to the query length to form the declared size. This is not the true
/// frame length, but deployed servers require exactly this value.
pub const DECLARED_SIZE_OVERHEAD: usize = 6;

/// Declared sizes at or above this are refused (the top value is reserved)
pub const MAX_DECLARED_SIZE: usize = u16::MAX as usize;

// =============================================================================
// Request Encoding
// =============================================================================

/// A request ready to be framed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPacket {
    declared_size: u16,

    /// Query bytes followed by the NUL terminator
    payload: Bytes,
}

impl RequestPacket {
    /// Build a packet for `query`, rejecting queries the size field can't express
    pub fn new(query: &Query) -> Result<Self> {
        let declared_size = query.len() + DECLARED_SIZE_OVERHEAD;
        if declared_size >= MAX_DECLARED_SIZE {
            return Err(ProtocolError::QueryTooLarge { declared_size });
        }

        let mut payload = BytesMut::with_capacity(query.len() + 1);
        payload.put_slice(query.as_bytes());
        payload.put_u8(0x00);

        Ok(Self {
            declared_size: declared_size as u16,
            payload: payload.freeze(),
        })
    }

    pub fn declared_size(&self) -> u16 {
        self.declared_size
    }

    /// Query bytes including the trailing NUL
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// The query text without its terminator
    pub fn query_bytes(&self) -> &[u8] {
        &self.payload[..self.payload.len().saturating_sub(1)]
    }

    pub fn encoded_len(&self) -> usize {
        REQUEST_HEADER_SIZE + self.payload.len()
    }

    /// Encode the full frame
    pub fn encode(&self) -> Bytes {
        let mut frame = BytesMut::with_capacity(self.encoded_len());
        frame.put_u8(0x00);
        frame.put_u8(PACKET_ID);
        frame.put_u16(self.declared_size);
        frame.put_bytes(0x00, REQUEST_PAD_LEN);
        frame.put_slice(&self.payload);
        frame.freeze()
    }

    /// Parse a complete request frame, as a server would
    pub fn decode(frame: &[u8]) -> Result<Self> {
        if frame.len() < REQUEST_HEADER_SIZE {
            return Err(ProtocolError::Truncated {
                expected: REQUEST_HEADER_SIZE,
                actual: frame.len(),
            });
        }

        let mut header = [0u8; REQUEST_HEADER_SIZE];
        header.copy_from_slice(&frame[..REQUEST_HEADER_SIZE]);
        let payload_len = request_payload_len(&header)?;

        let body = &frame[REQUEST_HEADER_SIZE..];
        if body.len() != payload_len {
            return Err(ProtocolError::Truncated {
                expected: payload_len,
                actual: body.len(),
            });
        }

        Ok(Self {
            declared_size: (payload_len - 1 + DECLARED_SIZE_OVERHEAD) as u16,
            payload: Bytes::copy_from_slice(body),
        })
    }
}

/// Encode a query into a complete request frame
///
/// Fails before any I/O happens if the query is too large.
pub fn encode_request(query: &Query) -> Result<Bytes> {
    Ok(RequestPacket::new(query)?.encode())
}

/// Read the declared size out of a request header
pub fn parse_declared_size(header: &[u8; REQUEST_HEADER_SIZE]) -> Result<u16> {
    let mut buf = &header[..];
    buf.advance(1);
    let packet_id = buf.get_u8();
    if packet_id != PACKET_ID {
        return Err(ProtocolError::UnexpectedPacketId(packet_id));
    }
    Ok(buf.get_u16())
}

/// Number of bytes (query + NUL) that follow a request header
pub fn request_payload_len(header: &[u8; REQUEST_HEADER_SIZE]) -> Result<usize> {
    let declared = parse_declared_size(header)? as usize;
    Ok(declared.saturating_sub(DECLARED_SIZE_OVERHEAD) + 1)
}

// =============================================================================
// Response Header
// =============================================================================

/// Decoded response header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub packet_id: u8,
    pub declared_len: u16,
    pub type_tag: u8,
}

impl ResponseHeader {
    pub fn kind(&self) -> ResponseKind {
        ResponseKind::from_tag(self.type_tag)
    }

    /// Kind plus the number of payload bytes to read
    pub fn resolve(&self) -> Result<(ResponseKind, u16)> {
        resolve(self.type_tag, self.declared_len)
    }
}

/// Decode the 5-byte response header
pub fn decode_header(bytes: &[u8; RESPONSE_HEADER_SIZE]) -> Result<ResponseHeader> {
    let mut buf = &bytes[..];
    buf.advance(1);

    let packet_id = buf.get_u8();
    if packet_id != PACKET_ID {
        // Not a Topic peer, or the stream is out of sync
        return Err(ProtocolError::UnexpectedPacketId(packet_id));
    }

    Ok(ResponseHeader {
        packet_id,
        declared_len: buf.get_u16(),
        type_tag: buf.get_u8(),
    })
}

/// Build the header a server sends in front of a `payload_len`-byte payload
pub fn encode_response_header(
    kind: ResponseKind,
    payload_len: usize,
) -> Result<[u8; RESPONSE_HEADER_SIZE]> {
    let declared = payload_len + kind.length_overhead() as usize;
    let declared = u16::try_from(declared).map_err(|_| ProtocolError::MalformedPayload {
        kind,
        reason: format!("{} byte payload does not fit the length field", payload_len),
    })?;

    let mut header = [0u8; RESPONSE_HEADER_SIZE];
    let mut buf = &mut header[..];
    buf.put_u8(0x00);
    buf.put_u8(PACKET_ID);
    buf.put_u16(declared);
    buf.put_u8(kind.tag());
    Ok(header)
}
