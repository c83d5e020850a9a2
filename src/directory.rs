//! Server Directory
//!
//! Maps the aliases users type to server addresses and presentation metadata.
//!
//! ## File Format
//! ```json
//! {
//!   "bagil": {
//!     "name": "Bagil Station",
//!     "address": "bagil.example.net",
//!     "port": 1337,
//!     "aliases": ["bagil", "bs"],
//!     "color": 16711680,
//!     "status_fields": [
//!       { "name": "Players", "key": "players", "inline": true },
//!       { "name": "Map", "key": "map_name" }
//!     ]
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};
use crate::protocol::DecodedResponse;

/// One field shown when rendering a status response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusField {
    /// Label shown to the user
    pub name: String,

    /// Key looked up in the response
    pub key: String,

    #[serde(default)]
    pub inline: bool,
}

/// A field with its value filled in from a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// A queryable server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    pub name: String,
    pub address: String,
    pub port: u16,

    #[serde(default)]
    pub aliases: Vec<String>,

    /// Display color as 0xRRGGBB
    #[serde(default)]
    pub color: Option<u32>,

    #[serde(default)]
    pub status_fields: Vec<StatusField>,
}

impl ServerEntry {
    /// Case-insensitive alias match
    pub fn matches(&self, alias: &str) -> bool {
        let alias = alias.to_lowercase();
        self.aliases.iter().any(|a| a.to_lowercase() == alias)
    }

    /// Fill in every status field from `response`.
    ///
    /// Multiple values under one key are joined with a space; a key the
    /// server didn't send renders as an empty string.
    pub fn render(&self, response: &DecodedResponse) -> Vec<RenderedField> {
        self.status_fields
            .iter()
            .map(|field| RenderedField {
                name: field.name.clone(),
                value: response.joined(&field.key).unwrap_or_default(),
                inline: field.inline,
            })
            .collect()
    }
}

/// All known servers, keyed by id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerDirectory {
    servers: BTreeMap<String, ServerEntry>,
}

impl ServerDirectory {
    /// Load a directory from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ProtocolError::Directory(format!("failed to read {}: {}", path.display(), e))
        })?;
        let directory = Self::from_json(&text)?;
        tracing::debug!("Loaded {} servers from {}", directory.len(), path.display());
        Ok(directory)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| ProtocolError::Directory(format!("invalid directory: {}", e)))
    }

    /// Insert or replace the entry stored under `id`
    pub fn insert(&mut self, id: impl Into<String>, entry: ServerEntry) {
        self.servers.insert(id.into(), entry);
    }

    /// First entry (in id order) whose aliases include `alias`
    pub fn find(&self, alias: &str) -> Option<&ServerEntry> {
        self.servers.values().find(|entry| entry.matches(alias))
    }

    /// Like [`find`](Self::find), but an unknown alias is an error
    pub fn lookup(&self, alias: &str) -> Result<&ServerEntry> {
        self.find(alias)
            .ok_or_else(|| ProtocolError::Directory(format!("server '{}' is not supported", alias)))
    }

    pub fn is_supported(&self, alias: &str) -> bool {
        self.find(alias).is_some()
    }

    /// Entries in id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ServerEntry)> {
        self.servers.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
