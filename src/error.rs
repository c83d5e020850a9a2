//! Error types for topic-client
//!
//! Provides a unified error type for every stage of a Topic exchange.

use thiserror::Error;

use crate::network::ConnectionState;
use crate::protocol::ResponseKind;

/// Result type alias using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Unified error type for topic-client operations
#[derive(Debug, Error)]
pub enum ProtocolError {
    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    #[error("query too large: declared size {declared_size} exceeds the 16-bit size field")]
    QueryTooLarge { declared_size: usize },

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("server unreachable at {addr}: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[source] std::io::Error),

    #[error("timed out waiting for {waiting_for}")]
    Timeout { waiting_for: &'static str },

    #[error("truncated response: received {actual} of {expected} bytes")]
    Truncated { expected: usize, actual: usize },

    #[error("invalid connection state: expected {expected:?}, was {actual:?}")]
    InvalidState {
        expected: ConnectionState,
        actual: ConnectionState,
    },

    // -------------------------------------------------------------------------
    // Response Errors
    // -------------------------------------------------------------------------
    #[error("unexpected packet id: expected 0x83, received 0x{0:02x}")]
    UnexpectedPacketId(u8),

    #[error("malformed length: declared length {declared} is too small for a {kind:?} response")]
    MalformedLength { kind: ResponseKind, declared: u16 },

    #[error("malformed {kind:?} payload: {reason}")]
    MalformedPayload { kind: ResponseKind, reason: String },

    // -------------------------------------------------------------------------
    // Directory Errors
    // -------------------------------------------------------------------------
    #[error("Directory error: {0}")]
    Directory(String),
}

impl ProtocolError {
    /// True when the exchange ran out of its time budget
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProtocolError::Timeout { .. })
    }

    /// True when the server could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ProtocolError::ConnectFailed { .. })
    }
}
