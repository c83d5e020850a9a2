//! Response Tests
//!
//! Tests for type-tag resolution and payload decoding.

use bytes::Bytes;
use topic_client::protocol::{decode_payload, resolve, DecodedResponse, ResponseKind};
use topic_client::ProtocolError;

// =============================================================================
// Resolution Tests
// =============================================================================

#[test]
fn test_resolve_adjustments() {
    assert_eq!(resolve(0x06, 10).unwrap(), (ResponseKind::String, 8));
    assert_eq!(resolve(0x2A, 5).unwrap(), (ResponseKind::Float, 4));
    assert_eq!(resolve(0x99, 7).unwrap(), (ResponseKind::Other(0x99), 7));
}

#[test]
fn test_resolve_exact_subtrahend_gives_empty_payload() {
    assert_eq!(resolve(0x06, 2).unwrap().1, 0);
    assert_eq!(resolve(0x2A, 1).unwrap().1, 0);
}

#[test]
fn test_resolve_underflow() {
    assert!(matches!(
        resolve(0x06, 0),
        Err(ProtocolError::MalformedLength {
            kind: ResponseKind::String,
            declared: 0
        })
    ));
    assert!(matches!(
        resolve(0x2A, 0),
        Err(ProtocolError::MalformedLength {
            kind: ResponseKind::Float,
            declared: 0
        })
    ));
}

// =============================================================================
// Payload Decoding Tests
// =============================================================================

#[test]
fn test_decode_string_payload() {
    let decoded = decode_payload(
        ResponseKind::String,
        Bytes::from_static(b"name=Alice&tag=x&tag=y"),
    )
    .unwrap();

    let fields = decoded.fields().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields["name"], vec!["Alice".to_string()]);
    assert_eq!(fields["tag"], vec!["x".to_string(), "y".to_string()]);
}

#[test]
fn test_decode_typical_status() {
    let payload = b"version=Example+1.0&mode=extended&respawn=0&players=42&map_name=Box%20Station&round_id=";
    let decoded = decode_payload(ResponseKind::String, Bytes::from_static(payload)).unwrap();

    assert_eq!(decoded.first("version"), Some("Example 1.0"));
    assert_eq!(decoded.first("players"), Some("42"));
    assert_eq!(decoded.first("map_name"), Some("Box Station"));
    assert_eq!(decoded.first("round_id"), Some(""));
}

#[test]
fn test_decode_empty_string_payload() {
    let decoded = decode_payload(ResponseKind::String, Bytes::new()).unwrap();
    assert!(decoded.fields().unwrap().is_empty());
}

#[test]
fn test_decode_float_payload() {
    let decoded =
        decode_payload(ResponseKind::Float, Bytes::copy_from_slice(&3.5f32.to_le_bytes())).unwrap();
    assert_eq!(decoded, DecodedResponse::Scalar(3.5));
}

#[test]
fn test_decode_float_is_not_big_endian() {
    let decoded =
        decode_payload(ResponseKind::Float, Bytes::copy_from_slice(&1.0f32.to_be_bytes())).unwrap();
    assert_ne!(decoded.as_scalar(), Some(1.0));
}

#[test]
fn test_decode_raw_payload() {
    let payload = Bytes::from_static(&[0xDE, 0xAD, 0xBE, 0xEF]);
    let decoded = decode_payload(ResponseKind::Other(0x01), payload.clone()).unwrap();
    assert_eq!(
        decoded,
        DecodedResponse::Raw {
            tag: 0x01,
            bytes: payload
        }
    );
    assert_eq!(decoded.kind(), ResponseKind::Other(0x01));
}
