//! Query definitions
//!
//! Normalizes caller-supplied text into the wire form of a Topic query.

use std::fmt;

/// Leading marker every Topic query carries on the wire
pub const QUERY_PREFIX: char = '?';

/// A query string in wire form (always starts with `?`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query(String);

impl Query {
    /// Build a query from raw caller text, prepending `?` when missing.
    ///
    /// No escaping is performed; callers must not smuggle control bytes in.
    pub fn build(raw: &str) -> Self {
        if raw.starts_with(QUERY_PREFIX) {
            Query(raw.to_string())
        } else {
            let mut query = String::with_capacity(raw.len() + 1);
            query.push(QUERY_PREFIX);
            query.push_str(raw);
            Query(query)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Length in bytes (not characters)
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true: a built query holds at least the `?` marker
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Query {
    fn from(raw: &str) -> Self {
        Query::build(raw)
    }
}

impl From<String> for Query {
    fn from(raw: String) -> Self {
        if raw.starts_with(QUERY_PREFIX) {
            Query(raw)
        } else {
            Query::build(&raw)
        }
    }
}

impl AsRef<str> for Query {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
