//! # topic-client
//!
//! A blocking client for the Topic protocol, the binary status protocol
//! spoken by a family of multiplayer game servers:
//! - Query normalization and request framing
//! - Header validation and type-tag dispatch
//! - Defensive, length-checked payload reads under a single time budget
//! - One connection per exchange, always closed on the way out
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Caller / topic-cli                           │
//! │          (ServerDirectory: alias → host:port)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    TopicClient                               │
//! │          (one exchange per call, fan-out helper)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Protocol   │          │ Connection  │
//!   │  (codec)    │          │ (TCP state) │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use topic_client::{ClientConfig, TopicClient};
//!
//! let client = TopicClient::new(ClientConfig::default());
//! let status = client.query("127.0.0.1", 1337, "status")?;
//! println!("{}", status);
//! # Ok::<(), topic_client::ProtocolError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod directory;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::ClientConfig;
pub use directory::{ServerDirectory, ServerEntry};
pub use error::{ProtocolError, Result};
pub use network::{query, Target, TopicClient};
pub use protocol::{DecodedResponse, Query, ResponseKind};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of topic-client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
