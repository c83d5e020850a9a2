//! Network Module
//!
//! TCP transport and the client that drives it.
//!
//! ## Architecture
//! - One connection per exchange, never reused
//! - Blocking I/O under a single time budget per exchange
//! - Parallel fan-out uses one scoped thread per target

mod client;
mod connection;

pub use client::{query, Target, TopicClient, STATUS_QUERY};
pub use connection::{Connection, ConnectionState};
