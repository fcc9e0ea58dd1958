//! Core type definitions for urify
//!
//! `DissectedUrl` is the record every other module consumes. Its field order
//! is the serialization order of the json mode, so do not reorder fields.

use serde::Serialize;

// =============================================================================
// Query Pairs
// =============================================================================

/// One `key=value` pair from the query string, form-decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryPair {
    pub key: String,
    pub value: String,
}

impl QueryPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Dissected URL
// =============================================================================

/// A URL split into its components.
///
/// Absent components are empty strings, never missing. Host parts keep the
/// casing of the input; only `scheme` is lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DissectedUrl {
    /// Lower-cased scheme, empty when the input had no `://`
    pub scheme: String,
    pub username: String,
    pub password: String,
    /// Labels left of the registrable domain, dot-joined
    pub subdomain: String,
    /// Registrable label immediately left of the tld
    pub domain: String,
    /// Longest matching public suffix (may span labels, e.g. `co.uk`)
    pub tld: String,
    /// Explicit port only; default ports are never inferred
    pub port: String,
    /// Path with percent-encoding preserved
    pub path: String,
    /// Query string as it appeared, without the leading `?`
    pub raw_query: String,
    /// Ordered pairs, duplicates kept
    pub query: Vec<QueryPair>,
    /// Fragment without the leading `#`
    pub fragment: String,
    /// `domain.tld`, empty unless both are present
    pub apex: String,
    /// The full host
    pub fqdn: String,
}

impl DissectedUrl {
    /// Query keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.query.iter().map(|pair| pair.key.as_str())
    }

    /// Query values in order.
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.query.iter().map(|pair| pair.value.as_str())
    }

    /// Raw `key=value` segments, aligned with `query`.
    pub fn params(&self) -> impl Iterator<Item = &str> + '_ {
        crate::url::query_segments(&self.raw_query)
    }

    /// File extension of the final path segment, without the dot.
    pub fn extension(&self) -> &str {
        crate::url::extension(&self.path)
    }
}
