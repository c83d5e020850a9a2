//! Topic Client
//!
//! Runs complete exchanges: one query, one connection, one typed result.

use std::io;

use crate::config::ClientConfig;
use crate::directory::ServerEntry;
use crate::error::{ProtocolError, Result};
use crate::protocol::{decode_header, decode_payload, encode_request, DecodedResponse, Query};

use super::Connection;

/// Query sent by [`TopicClient::status`]
pub const STATUS_QUERY: &str = "?status";

/// Where to send a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl From<(&str, u16)> for Target {
    fn from((host, port): (&str, u16)) -> Self {
        Target::new(host, port)
    }
}

impl From<&ServerEntry> for Target {
    fn from(entry: &ServerEntry) -> Self {
        Target::new(entry.address.as_str(), entry.port)
    }
}

/// Blocking Topic client
///
/// Holds no connection state between calls, so one client can be shared
/// freely across threads.
#[derive(Debug, Clone, Default)]
pub struct TopicClient {
    config: ClientConfig,
}

impl TopicClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send `raw` (normalized to start with `?`) and decode the reply.
    ///
    /// Oversized queries are rejected before a socket is opened. The socket
    /// is closed on every exit path.
    pub fn query(&self, host: &str, port: u16, raw: &str) -> Result<DecodedResponse> {
        let query = Query::build(raw);
        let frame = encode_request(&query)?;

        tracing::debug!("Sending {} to {}:{}", query, host, port);

        let mut conn = Connection::new(self.config.clone());
        let result = exchange(&mut conn, host, port, &frame);
        conn.close();

        if let Err(ref e) = result {
            tracing::debug!("Query {} to {}:{} failed: {}", query, host, port, e);
        }
        result
    }

    /// Query a directory entry
    pub fn query_entry(&self, entry: &ServerEntry, raw: &str) -> Result<DecodedResponse> {
        self.query(&entry.address, entry.port, raw)
    }

    /// Ask a directory entry for its status
    pub fn status(&self, entry: &ServerEntry) -> Result<DecodedResponse> {
        self.query_entry(entry, STATUS_QUERY)
    }

    /// Send the same query to every target in parallel.
    ///
    /// Each target gets its own thread and connection; results come back in
    /// the order of `targets`.
    pub fn query_many(&self, targets: &[Target], raw: &str) -> Vec<Result<DecodedResponse>> {
        let outcome = crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = targets
                .iter()
                .map(|target| scope.spawn(move |_| self.query(&target.host, target.port, raw)))
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|_| Err(worker_panicked())))
                .collect::<Vec<_>>()
        });

        match outcome {
            Ok(results) => results,
            Err(_) => targets.iter().map(|_| Err(worker_panicked())).collect(),
        }
    }
}

/// Query `host:port` with the default configuration
pub fn query(host: &str, port: u16, raw: &str) -> Result<DecodedResponse> {
    TopicClient::default().query(host, port, raw)
}

/// connect → send → header → payload → decode
fn exchange(conn: &mut Connection, host: &str, port: u16, frame: &[u8]) -> Result<DecodedResponse> {
    conn.connect(host, port)?;
    conn.send(frame)?;

    let raw_header = conn.recv_header()?;
    let header = decode_header(&raw_header).map_err(|e| conn.abort(e))?;
    let (kind, payload_len) = header.resolve().map_err(|e| conn.abort(e))?;
    tracing::trace!(
        "Response from {}: {:?}, declared {}, reading {}",
        conn.peer_addr(),
        kind,
        header.declared_len,
        payload_len
    );

    let payload = conn.recv_payload(payload_len)?;
    decode_payload(kind, payload).map_err(|e| conn.abort(e))
}

fn worker_panicked() -> ProtocolError {
    ProtocolError::IoError(io::Error::new(io::ErrorKind::Other, "query worker panicked"))
}
