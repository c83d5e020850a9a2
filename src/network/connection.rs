//! Connection Handler
//!
//! Owns the socket for a single Topic exchange.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};

use crate::config::ClientConfig;
use crate::error::{ProtocolError, Result};
use crate::protocol::RESPONSE_HEADER_SIZE;

/// Lifecycle of a connection
///
/// ```text
/// Idle → Connected → RequestSent → HeaderReceived → PayloadReceived → Closed
///   └──────────┴────────────┴──────────────┴──────────→ Faulted ──────→ Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connected,
    RequestSent,
    HeaderReceived,
    PayloadReceived,
    Closed,
    Faulted,
}

/// One request/response exchange over one TCP connection
///
/// Operations must be called in lifecycle order. Any failure faults the
/// connection and releases the socket immediately; dropping the connection
/// releases it too, so no exit path can leak it.
pub struct Connection {
    /// Socket, present from connect until close or fault
    stream: Option<TcpStream>,

    state: ConnectionState,

    /// End of the exchange's time budget, fixed when connect starts
    deadline: Option<Instant>,

    config: ClientConfig,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            stream: None,
            state: ConnectionState::Idle,
            deadline: None,
            config,
            peer_addr: String::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True once the socket has been released (or was never opened)
    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Open the TCP stream and start the exchange's time budget.
    ///
    /// Name resolution goes through the system resolver, which has no
    /// timeout of its own: the budget starts when it returns, so a stalled
    /// resolver can hold this call past the configured timeout.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        self.expect_state(ConnectionState::Idle)?;

        self.peer_addr = format!("{}:{}", host, port);
        let deadline = Instant::now() + self.config.timeout;
        self.deadline = Some(deadline);

        let stream = match open_stream(host, port, deadline) {
            Ok(stream) => stream,
            Err(source) => {
                let addr = self.peer_addr.clone();
                return Err(self.fault(ProtocolError::ConnectFailed { addr, source }));
            }
        };

        if let Err(e) = stream.set_nodelay(self.config.nodelay) {
            return Err(self.fault(ProtocolError::IoError(e)));
        }

        tracing::debug!("Connected to {}", self.peer_addr);
        self.stream = Some(stream);
        self.state = ConnectionState::Connected;
        Ok(())
    }

    /// Write the whole request frame
    pub fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.expect_state(ConnectionState::Connected)?;

        if let Err(e) = self.write_frame(frame) {
            return Err(self.fault(e));
        }

        tracing::trace!("Sent {} byte request to {}", frame.len(), self.peer_addr);
        self.state = ConnectionState::RequestSent;
        Ok(())
    }

    /// Read exactly the 5 header bytes
    pub fn recv_header(&mut self) -> Result<[u8; RESPONSE_HEADER_SIZE]> {
        self.expect_state(ConnectionState::RequestSent)?;

        let mut header = [0u8; RESPONSE_HEADER_SIZE];
        if let Err(e) = self.read_full(&mut header, "response header") {
            return Err(self.fault(e));
        }

        tracing::trace!("Received header {:02x?} from {}", header, self.peer_addr);
        self.state = ConnectionState::HeaderReceived;
        Ok(header)
    }

    /// Read exactly `len` payload bytes
    pub fn recv_payload(&mut self, len: u16) -> Result<Bytes> {
        self.expect_state(ConnectionState::HeaderReceived)?;

        let mut payload = BytesMut::zeroed(len as usize);
        if let Err(e) = self.read_full(&mut payload, "response payload") {
            return Err(self.fault(e));
        }

        tracing::trace!("Received {} byte payload from {}", len, self.peer_addr);
        self.state = ConnectionState::PayloadReceived;
        Ok(payload.freeze())
    }

    /// Fault the exchange over an error found after the bytes arrived, such as
    /// an undecodable header or payload. Releases the socket and hands the
    /// error back.
    pub fn abort(&mut self, error: ProtocolError) -> ProtocolError {
        if self.state == ConnectionState::Closed {
            return error;
        }
        self.fault(error)
    }

    /// Release the socket. Safe to call from any state, any number of times.
    pub fn close(&mut self) {
        self.release();
        if self.state != ConnectionState::Closed {
            tracing::trace!("Closing connection to {} from {:?}", self.peer_addr, self.state);
            self.state = ConnectionState::Closed;
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn expect_state(&self, expected: ConnectionState) -> Result<()> {
        if self.state != expected {
            return Err(ProtocolError::InvalidState {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    /// Abort the exchange: drop the socket and remember the failure
    fn fault(&mut self, error: ProtocolError) -> ProtocolError {
        tracing::warn!(
            "Exchange with {} failed in {:?}: {}",
            self.peer_addr,
            self.state,
            error
        );
        self.release();
        self.state = ConnectionState::Faulted;
        error
    }

    fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            // Peer may already be gone; dropping the stream closes it regardless
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    /// Time left in the budget, or None when it is used up
    fn remaining(&self) -> Option<Duration> {
        let left = self.deadline?.checked_duration_since(Instant::now())?;
        (!left.is_zero()).then_some(left)
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        let remaining = self.remaining().ok_or_else(|| {
            ProtocolError::IoError(io::Error::new(
                ErrorKind::TimedOut,
                "exchange budget spent before the request was written",
            ))
        })?;
        let stream = self.stream.as_mut().ok_or(ProtocolError::InvalidState {
            expected: ConnectionState::Connected,
            actual: self.state,
        })?;

        stream
            .set_write_timeout(Some(remaining))
            .map_err(ProtocolError::IoError)?;
        stream.write_all(frame).map_err(ProtocolError::IoError)?;
        stream.flush().map_err(ProtocolError::IoError)?;
        Ok(())
    }

    /// Fill `buf` completely, re-arming the read timeout with whatever is left
    /// of the budget before every read.
    fn read_full(&mut self, buf: &mut [u8], waiting_for: &'static str) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let remaining = self
                .remaining()
                .ok_or(ProtocolError::Timeout { waiting_for })?;
            let stream = self.stream.as_mut().ok_or(ProtocolError::InvalidState {
                expected: ConnectionState::RequestSent,
                actual: self.state,
            })?;
            stream
                .set_read_timeout(Some(remaining))
                .map_err(ProtocolError::IoError)?;

            match stream.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(ProtocolError::Truncated {
                        expected: buf.len(),
                        actual: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                // Unix reports an expired read timeout as WouldBlock, Windows as TimedOut
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(ProtocolError::Timeout { waiting_for })
                }
                Err(e) => return Err(ProtocolError::IoError(e)),
            }
        }
        Ok(())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

/// Resolve `host` and try each address until one accepts within the deadline
fn open_stream(host: &str, port: u16, deadline: Instant) -> io::Result<TcpStream> {
    let mut last_error = None;

    for addr in (host, port).to_socket_addrs()? {
        let remaining = deadline
            .checked_duration_since(Instant::now())
            .filter(|d| !d.is_zero())
            .ok_or_else(|| io::Error::new(ErrorKind::TimedOut, "connect timed out"))?;

        match TcpStream::connect_timeout(&addr, remaining) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        io::Error::new(ErrorKind::NotFound, "host resolved to no addresses")
    }))
}
