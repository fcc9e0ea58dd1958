//! Component filters
//!
//! A [`FilterSpec`] holds candidate values per [`FilterCategory`]. Values
//! inside one category are always OR-ed. Categories are OR-ed by default and
//! AND-ed when [`FilterFlags::ABSOLUTE`] is set; [`FilterFlags::INVERSE`]
//! negates the combined result, turning the allow-list into a deny-list.
//!
//! # Examples
//!
//! ```
//! use urify_core::filter::{FilterCategory, FilterSpec};
//! use urify_core::url::dissect;
//!
//! let spec = FilterSpec::new().with(FilterCategory::Extension, ["pdf", "jpg"]);
//! assert!(spec.matches(&dissect("https://example.com/cat.jpg")));
//! assert!(!spec.matches(&dissect("https://example.com/cat.png")));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use log::trace;

use crate::types::DissectedUrl;
use crate::url::{is_port, normalize_port};

/// Error type for filter configuration.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("Unknown filter category: {0}")]
    UnknownCategory(String),
}

// =============================================================================
// Categories
// =============================================================================

/// URL component a filter can select on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterCategory {
    Scheme,
    Subdomain,
    Domain,
    Tld,
    Extension,
    Port,
    Apex,
    Fqdn,
}

impl FilterCategory {
    pub const ALL: [FilterCategory; 8] = [
        Self::Scheme,
        Self::Subdomain,
        Self::Domain,
        Self::Tld,
        Self::Extension,
        Self::Port,
        Self::Apex,
        Self::Fqdn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheme => "scheme",
            Self::Subdomain => "subdomain",
            Self::Domain => "domain",
            Self::Tld => "tld",
            Self::Extension => "extension",
            Self::Port => "port",
            Self::Apex => "apex",
            Self::Fqdn => "fqdn",
        }
    }

    /// The component of `url` this category compares against.
    pub fn select(self, url: &DissectedUrl) -> &str {
        match self {
            Self::Scheme => &url.scheme,
            Self::Subdomain => &url.subdomain,
            Self::Domain => &url.domain,
            Self::Tld => &url.tld,
            Self::Extension => url.extension(),
            Self::Port => &url.port,
            Self::Apex => &url.apex,
            Self::Fqdn => &url.fqdn,
        }
    }

    /// Canonical form of a candidate value.
    fn normalize(self, value: &str) -> String {
        let value = value.trim();
        match self {
            Self::Extension => value.trim_start_matches('.').to_lowercase(),
            Self::Port if is_port(value) => normalize_port(value),
            _ => value.to_lowercase(),
        }
    }
}

impl FromStr for FilterCategory {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scheme" => Ok(Self::Scheme),
            "subdomain" | "sub" => Ok(Self::Subdomain),
            "domain" => Ok(Self::Domain),
            "tld" => Ok(Self::Tld),
            "extension" | "ext" => Ok(Self::Extension),
            "port" => Ok(Self::Port),
            "apex" => Ok(Self::Apex),
            "fqdn" => Ok(Self::Fqdn),
            _ => Err(FilterError::UnknownCategory(s.to_string())),
        }
    }
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Filter Flags
// =============================================================================

bitflags::bitflags! {
    /// Modifiers applied after the per-category checks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FilterFlags: u8 {
        /// Negate the combined result (deny-list)
        const INVERSE = 1 << 0;
        /// Require every populated category to match
        const ABSOLUTE = 1 << 1;
    }
}

// =============================================================================
// Filter Spec
// =============================================================================

/// Candidate values per category plus modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    categories: BTreeMap<FilterCategory, BTreeSet<String>>,
    flags: FilterFlags,
}

impl FilterSpec {
    /// An empty spec passes every URL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add candidate values for a category. An empty value list is ignored.
    pub fn with<I, S>(mut self, category: FilterCategory, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.insert(category, values);
        self
    }

    pub fn insert<I, S>(&mut self, category: FilterCategory, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = values
            .into_iter()
            .map(|v| category.normalize(v.as_ref()))
            .peekable();
        if values.peek().is_none() {
            return;
        }
        self.categories.entry(category).or_default().extend(values);
    }

    pub fn inverse(mut self, inverse: bool) -> Self {
        self.flags.set(FilterFlags::INVERSE, inverse);
        self
    }

    pub fn absolute(mut self, absolute: bool) -> Self {
        self.flags.set(FilterFlags::ABSOLUTE, absolute);
        self
    }

    pub fn flags(&self) -> FilterFlags {
        self.flags
    }

    /// True when no category is populated.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Populated categories in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = FilterCategory> + '_ {
        self.categories.keys().copied()
    }

    /// Decide whether `url` passes.
    pub fn matches(&self, url: &DissectedUrl) -> bool {
        if self.categories.is_empty() {
            return true;
        }

        let mut checks = self
            .categories
            .iter()
            .map(|(category, candidates)| category_matches(*category, candidates, url));

        let combined = if self.flags.contains(FilterFlags::ABSOLUTE) {
            checks.all(|hit| hit)
        } else {
            checks.any(|hit| hit)
        };

        let pass = combined != self.flags.contains(FilterFlags::INVERSE);
        trace!("filter {:?} on {:?}: pass={}", self.flags, url.fqdn, pass);
        pass
    }
}

/// Evaluate `spec` against `url`.
pub fn matches(url: &DissectedUrl, spec: &FilterSpec) -> bool {
    spec.matches(url)
}

#[inline]
fn category_matches(category: FilterCategory, candidates: &BTreeSet<String>, url: &DissectedUrl) -> bool {
    let component = category.select(url).to_lowercase();
    candidates.contains(&component)
}
