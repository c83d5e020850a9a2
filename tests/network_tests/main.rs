//! Network Tests
//!
//! Exchanges against loopback peers.

#[path = "../common/mod.rs"]
mod common;

mod client_tests;
