//! Output projections of a dissected URL
//!
//! Query-based modes yield one line per query pair; the others yield exactly
//! one line, which may be empty.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::types::DissectedUrl;

/// Error type for projections.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Unknown dissect mode: {0}")]
    UnknownMode(String),
    #[error("Failed to serialize URL: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Modes
// =============================================================================

/// Named view of a dissected URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Query keys, one per pair
    Keys,
    /// Query values, one per pair
    Values,
    /// Raw `key=value` segments, one per pair
    Params,
    Path,
    Apex,
    Fqdn,
    /// The whole record as a JSON object
    Json,
}

impl Mode {
    pub const ALL: [Mode; 7] = [
        Self::Keys,
        Self::Values,
        Self::Params,
        Self::Path,
        Self::Apex,
        Self::Fqdn,
        Self::Json,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keys => "keys",
            Self::Values => "values",
            Self::Params => "params",
            Self::Path => "path",
            Self::Apex => "apex",
            Self::Fqdn => "fqdn",
            Self::Json => "json",
        }
    }
}

impl FromStr for Mode {
    type Err = ProjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ProjectError::UnknownMode(s.to_string()))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Projection
// =============================================================================

/// Lazy sequence of output lines for one URL.
pub struct Projection<'a> {
    inner: Lines<'a>,
}

enum Lines<'a> {
    Many(Box<dyn Iterator<Item = &'a str> + 'a>),
    Single(Option<Cow<'a, str>>),
}

impl<'a> Iterator for Projection<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Lines::Many(lines) => lines.next().map(Cow::Borrowed),
            Lines::Single(line) => line.take(),
        }
    }
}

/// Project `url` into the lines requested by `mode`.
///
/// Only `json` can fail.
pub fn project(url: &DissectedUrl, mode: Mode) -> Result<Projection<'_>, ProjectError> {
    let inner = match mode {
        Mode::Keys => Lines::Many(Box::new(url.keys())),
        Mode::Values => Lines::Many(Box::new(url.values())),
        Mode::Params => Lines::Many(Box::new(url.params())),
        Mode::Path => Lines::Single(Some(Cow::Borrowed(url.path.as_str()))),
        Mode::Apex => Lines::Single(Some(Cow::Borrowed(url.apex.as_str()))),
        Mode::Fqdn => Lines::Single(Some(Cow::Borrowed(url.fqdn.as_str()))),
        Mode::Json => Lines::Single(Some(Cow::Owned(serde_json::to_string(url)?))),
    };

    Ok(Projection { inner })
}
