//! Client Tests
//!
//! End-to-end queries through TopicClient.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::time::Duration;

use topic_client::network::Target;
use topic_client::{ClientConfig, DecodedResponse, ProtocolError, ResponseKind, TopicClient};

use crate::common::{
    closed_port, float_reply, raw_reply, read_request, replying_peer, spawn_peer, string_reply,
};

fn client() -> TopicClient {
    TopicClient::new(ClientConfig::builder().timeout(Duration::from_secs(2)).build())
}

// =============================================================================
// Successful Queries
// =============================================================================

#[test]
fn test_status_query() {
    let peer = replying_peer(string_reply(
        "version=Example&players=12&map_name=Box+Station&admins=0",
    ));

    let response = client().query("127.0.0.1", peer.port, "status").unwrap();

    assert_eq!(peer.join(), b"?status");
    assert_eq!(response.kind(), ResponseKind::String);
    assert_eq!(response.first("players"), Some("12"));
    assert_eq!(response.first("map_name"), Some("Box Station"));
}

#[test]
fn test_duplicate_keys_survive_the_wire() {
    let peer = replying_peer(string_reply("name=Alice&tag=x&tag=y"));

    let response = client().query("127.0.0.1", peer.port, "?who").unwrap();

    assert_eq!(peer.join(), b"?who");
    assert_eq!(response.joined("tag").as_deref(), Some("x y"));
    assert_eq!(response.first("name"), Some("Alice"));
}

#[test]
fn test_float_query() {
    let peer = replying_peer(float_reply(3.5));

    let response = client().query("127.0.0.1", peer.port, "?ping").unwrap();

    peer.join();
    assert_eq!(response, DecodedResponse::Scalar(3.5));
}

#[test]
fn test_raw_query() {
    let peer = replying_peer(raw_reply(0x99, &[1, 2, 3, 4, 5]));

    let response = client().query("127.0.0.1", peer.port, "?revision").unwrap();

    peer.join();
    assert_eq!(response.kind(), ResponseKind::Other(0x99));
    assert_eq!(response.as_raw().map(|b| b.to_vec()), Some(vec![1, 2, 3, 4, 5]));
}

#[test]
fn test_free_function_uses_defaults() {
    let peer = replying_peer(float_reply(-1.25));
    let response = topic_client::query("127.0.0.1", peer.port, "?ping").unwrap();
    peer.join();
    assert_eq!(response.as_scalar(), Some(-1.25));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_wrong_protocol_peer() {
    let peer = replying_peer(b"HTTP/1.1 400 Bad Request\r\n\r\n".to_vec());

    let result = client().query("127.0.0.1", peer.port, "?status");

    peer.join();
    assert!(matches!(result, Err(ProtocolError::UnexpectedPacketId(b'T'))));
}

#[test]
fn test_wrong_packet_id_closes_socket() {
    let peer = spawn_peer(|mut stream| {
        read_request(&mut stream);
        stream.write_all(&[0x00, 0x84, 0x00, 0x0A, 0x06]).unwrap();
        // Report whether the client hung up after rejecting the header
        let mut buf = [0u8; 1];
        matches!(stream.read(&mut buf), Ok(0))
    });

    let result = client().query("127.0.0.1", peer.port, "?status");

    assert!(matches!(result, Err(ProtocolError::UnexpectedPacketId(0x84))));
    assert!(peer.join(), "peer should observe the client closing");
}

#[test]
fn test_malformed_declared_length() {
    let peer = replying_peer(vec![0x00, 0x83, 0x00, 0x01, 0x06]);

    let result = client().query("127.0.0.1", peer.port, "?status");

    peer.join();
    assert!(matches!(
        result,
        Err(ProtocolError::MalformedLength {
            kind: ResponseKind::String,
            declared: 1
        })
    ));
}

#[test]
fn test_short_float_payload() {
    // declared 4 -> 3 payload bytes, which is not an f32
    let peer = replying_peer(vec![0x00, 0x83, 0x00, 0x04, 0x2A, 1, 2, 3]);

    let result = client().query("127.0.0.1", peer.port, "?ping");

    peer.join();
    assert!(matches!(
        result,
        Err(ProtocolError::MalformedPayload {
            kind: ResponseKind::Float,
            ..
        })
    ));
}

#[test]
fn test_truncated_exchange() {
    let peer = spawn_peer(|mut stream| {
        read_request(&mut stream);
        stream.write_all(&[0x00, 0x83, 0x00, 0x08, 0x99, 1, 2, 3]).unwrap();
    });

    let result = client().query("127.0.0.1", peer.port, "?status");

    peer.join();
    assert!(matches!(
        result,
        Err(ProtocolError::Truncated {
            expected: 8,
            actual: 3
        })
    ));
}

#[test]
fn test_unreachable_server() {
    let result = client().query("127.0.0.1", closed_port(), "?status");
    assert!(matches!(result, Err(ProtocolError::ConnectFailed { .. })));
}

#[test]
fn test_oversized_query_never_connects() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let port = listener.local_addr().unwrap().port();

    let result = client().query("127.0.0.1", port, &"x".repeat(70_000));

    assert!(matches!(result, Err(ProtocolError::QueryTooLarge { .. })));
    assert_eq!(
        listener.accept().unwrap_err().kind(),
        std::io::ErrorKind::WouldBlock
    );
}

// =============================================================================
// Fan-out
// =============================================================================

#[test]
fn test_query_many_keeps_order() {
    let first = replying_peer(string_reply("players=1"));
    let second = replying_peer(float_reply(2.0));
    let dead = closed_port();

    let targets = vec![
        Target::new("127.0.0.1", first.port),
        Target::new("127.0.0.1", dead),
        Target::new("127.0.0.1", second.port),
    ];
    let results = client().query_many(&targets, "status");

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().first("players"), Some("1"));
    assert!(results[1].as_ref().unwrap_err().is_unreachable());
    assert_eq!(results[2].as_ref().unwrap().as_scalar(), Some(2.0));

    assert_eq!(first.join(), b"?status");
    assert_eq!(second.join(), b"?status");
}

#[test]
fn test_query_many_empty() {
    assert!(client().query_many(&[], "?status").is_empty());
}
