//! Response definitions
//!
//! Maps the response type tag onto a decoding strategy and turns a
//! fully-received payload into a typed value.

use std::fmt;
use std::ops::Index;

use bytes::Bytes;

use crate::error::{ProtocolError, Result};

/// Type tag of a URL-encoded key/value response
pub const TAG_STRING: u8 = 0x06;

/// Type tag of a single-precision float response
pub const TAG_FLOAT: u8 = 0x2A;

// Bytes the server counts in its declared length that never show up in the
// payload we read. Empirically required by the deployed server population;
// they are not derivable from the frame layout, so do not "fix" them.
const STRING_LENGTH_OVERHEAD: u16 = 2;
const FLOAT_LENGTH_OVERHEAD: u16 = 1;

/// Size of a FLOAT payload
pub const FLOAT_PAYLOAD_LEN: usize = 4;

/// Decoding strategy selected by the response type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// `key=value&...` text
    String,
    /// Little-endian f32
    Float,
    /// Anything else, handed back untouched
    Other(u8),
}

impl ResponseKind {
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            TAG_STRING => ResponseKind::String,
            TAG_FLOAT => ResponseKind::Float,
            other => ResponseKind::Other(other),
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            ResponseKind::String => TAG_STRING,
            ResponseKind::Float => TAG_FLOAT,
            ResponseKind::Other(tag) => tag,
        }
    }

    /// Amount subtracted from the declared length to get the payload length
    pub fn length_overhead(self) -> u16 {
        match self {
            ResponseKind::String => STRING_LENGTH_OVERHEAD,
            ResponseKind::Float => FLOAT_LENGTH_OVERHEAD,
            ResponseKind::Other(_) => 0,
        }
    }
}

/// Resolve a type tag and declared length into the kind and the number of
/// payload bytes that actually follow the header.
pub fn resolve(tag: u8, declared_len: u16) -> Result<(ResponseKind, u16)> {
    let kind = ResponseKind::from_tag(tag);
    let adjusted = declared_len
        .checked_sub(kind.length_overhead())
        .ok_or(ProtocolError::MalformedLength {
            kind,
            declared: declared_len,
        })?;
    Ok((kind, adjusted))
}

/// Parsed STRING payload: every key maps to all of its values.
///
/// Keys stay in the order the server first sent them; payloads hold a
/// handful of keys, so lookups are a linear scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    entries: Vec<(String, Vec<String>)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the values of `key`, adding the key if it is new
    pub fn push(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Vec<String>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in arrival order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in arrival order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, values)| (k.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Index<&str> for Fields {
    type Output = Vec<String>;

    fn index(&self, key: &str) -> &Vec<String> {
        match self.get(key) {
            Some(values) => values,
            None => panic!("no field named {:?}", key),
        }
    }
}

/// A fully decoded response
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResponse {
    KeyValueMap(Fields),
    Scalar(f32),
    /// Opaque payload plus the tag it arrived with
    Raw { tag: u8, bytes: Bytes },
}

impl DecodedResponse {
    pub fn kind(&self) -> ResponseKind {
        match self {
            DecodedResponse::KeyValueMap(_) => ResponseKind::String,
            DecodedResponse::Scalar(_) => ResponseKind::Float,
            DecodedResponse::Raw { tag, .. } => ResponseKind::Other(*tag),
        }
    }

    pub fn fields(&self) -> Option<&Fields> {
        match self {
            DecodedResponse::KeyValueMap(fields) => Some(fields),
            _ => None,
        }
    }

    /// All values supplied for `key`
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.fields()?.get(key).map(Vec::as_slice)
    }

    /// First value supplied for `key`
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)?.first().map(String::as_str)
    }

    /// All values for `key` joined with a single space
    pub fn joined(&self, key: &str) -> Option<String> {
        self.get(key).map(|values| values.join(" "))
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            DecodedResponse::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&Bytes> {
        match self {
            DecodedResponse::Raw { bytes, .. } => Some(bytes),
            _ => None,
        }
    }
}

impl fmt::Display for DecodedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedResponse::KeyValueMap(fields) => {
                for (i, (key, values)) in fields.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}: {}", key, values.join(" "))?;
                }
                Ok(())
            }
            DecodedResponse::Scalar(value) => write!(f, "{}", value),
            DecodedResponse::Raw { bytes, .. } => write!(f, "{}", String::from_utf8_lossy(bytes)),
        }
    }
}

/// Decode a complete payload according to its kind
pub fn decode_payload(kind: ResponseKind, payload: Bytes) -> Result<DecodedResponse> {
    match kind {
        ResponseKind::String => Ok(DecodedResponse::KeyValueMap(parse_fields(&payload))),
        ResponseKind::Float => {
            let raw = <[u8; FLOAT_PAYLOAD_LEN]>::try_from(&payload[..]).map_err(|_| {
                ProtocolError::MalformedPayload {
                    kind,
                    reason: format!("expected {} bytes, got {}", FLOAT_PAYLOAD_LEN, payload.len()),
                }
            })?;
            // Payload floats are little-endian, unlike the header fields
            Ok(DecodedResponse::Scalar(f32::from_le_bytes(raw)))
        }
        ResponseKind::Other(tag) => Ok(DecodedResponse::Raw {
            tag,
            bytes: payload,
        }),
    }
}

/// Parse `key=value&key=value` text, keeping blank values and duplicates.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn parse_fields(payload: &[u8]) -> Fields {
    let mut fields = Fields::new();
    for (key, value) in form_urlencoded::parse(payload) {
        fields.push(key.into_owned(), value.into_owned());
    }
    fields
}
