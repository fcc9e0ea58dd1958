//! Public Suffix List (PSL) matching for subdomain / domain / tld splitting
//!
//! Rules are held in a trie keyed by the reversed label sequence, so a lookup
//! walks at most one node per host label. The bundled rule set is parsed once
//! on first use and shared read-only afterwards.
//!
//! # Examples
//!
//! ```
//! use urify_core::psl::{split_host, SuffixList};
//!
//! let parts = split_host("sub.example.co.uk", SuffixList::builtin());
//! assert_eq!(parts.subdomain, "sub");
//! assert_eq!(parts.domain, "example");
//! assert_eq!(parts.tld, "co.uk");
//! ```

use std::collections::HashMap;
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::OnceLock;

use log::{debug, warn};

/// Rule text compiled into the binary.
const BUILTIN_RULES: &str = include_str!("../data/public_suffix_list.dat");

const WILDCARD: &str = "*";

/// Error type for suffix list loading.
#[derive(Debug, thiserror::Error)]
pub enum PslError {
    #[error("Failed to read suffix list '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Suffix list '{0}' contains no usable rules")]
    Empty(String),
}

// =============================================================================
// Rule Trie
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleKind {
    /// Plain rule, including wildcards (stored under a `*` child)
    Suffix,
    /// Exception rule (`!www.ck`) - the suffix is the rule minus its first label
    Exception,
}

#[derive(Debug, Default)]
struct Node {
    children: HashMap<String, Node>,
    kind: Option<RuleKind>,
}

impl Node {
    #[inline]
    fn has_wildcard(&self) -> bool {
        self.children
            .get(WILDCARD)
            .map_or(false, |n| n.kind == Some(RuleKind::Suffix))
    }
}

/// A set of public suffix rules.
#[derive(Debug, Default)]
pub struct SuffixList {
    root: Node,
    rules: usize,
}

static BUILTIN: OnceLock<SuffixList> = OnceLock::new();

impl SuffixList {
    /// Create an empty list. Every lookup falls back to the last label.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bundled rule set.
    pub fn builtin() -> &'static SuffixList {
        BUILTIN.get_or_init(|| {
            let list = Self::parse(BUILTIN_RULES);
            debug!("loaded {} built-in suffix rules", list.len());
            list
        })
    }

    /// Parse rules in the Public Suffix List text format.
    ///
    /// Blank lines and `//` comments are skipped, and only the first
    /// whitespace-separated token of a line is read.
    pub fn parse(text: &str) -> Self {
        let mut list = Self::new();

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            if let Some(rule) = line.split_whitespace().next() {
                list.insert(rule);
            }
        }

        list
    }

    /// Load a rule file, e.g. the upstream `public_suffix_list.dat`.
    pub fn from_file(path: &Path) -> Result<Self, PslError> {
        let text = fs::read_to_string(path).map_err(|source| PslError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let list = Self::parse(&text);
        if list.is_empty() {
            return Err(PslError::Empty(path.display().to_string()));
        }

        debug!("loaded {} suffix rules from {}", list.len(), path.display());
        Ok(list)
    }

    /// Add a single rule. Returns false if the rule was rejected.
    pub fn insert(&mut self, rule: &str) -> bool {
        let rule = rule.trim().to_lowercase();
        let (kind, body) = match rule.strip_prefix('!') {
            Some(rest) => (RuleKind::Exception, rest),
            None => (RuleKind::Suffix, rule.as_str()),
        };

        let labels: Vec<&str> = body.split('.').collect();
        if labels.iter().any(|l| l.is_empty()) {
            warn!("skipping suffix rule with empty label: {:?}", rule);
            return false;
        }
        // Wildcards are only meaningful as the leftmost label.
        if labels.iter().skip(1).any(|l| *l == WILDCARD) {
            warn!("skipping suffix rule with inner wildcard: {:?}", rule);
            return false;
        }
        if kind == RuleKind::Exception && (labels.len() < 2 || labels[0] == WILDCARD) {
            warn!("skipping malformed exception rule: {:?}", rule);
            return false;
        }

        let mut node = &mut self.root;
        for label in labels.iter().rev() {
            node = node.children.entry((*label).to_string()).or_default();
        }
        if node.kind.is_none() {
            self.rules += 1;
        }
        node.kind = Some(kind);
        true
    }

    /// Number of distinct rules.
    pub fn len(&self) -> usize {
        self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules == 0
    }

    /// Return the trailing labels forming the effective suffix.
    ///
    /// `labels` must be lower-cased, most significant label last. The longest
    /// matching rule wins and an exception rule overrides everything else.
    /// When nothing matches, the last label alone is the suffix, so the
    /// result is only empty for an empty input.
    pub fn longest_suffix<'a, S: AsRef<str>>(&self, labels: &'a [S]) -> &'a [S] {
        let len = self.suffix_len(labels);
        &labels[labels.len() - len..]
    }

    fn suffix_len<S: AsRef<str>>(&self, labels: &[S]) -> usize {
        if labels.is_empty() {
            return 0;
        }

        let mut best = 0;
        let mut node = &self.root;

        for (depth, label) in labels.iter().rev().enumerate() {
            let wildcard = node.has_wildcard();
            match node.children.get(label.as_ref()) {
                Some(child) => {
                    match child.kind {
                        Some(RuleKind::Exception) => return depth,
                        Some(RuleKind::Suffix) => best = depth + 1,
                        None if wildcard => best = depth + 1,
                        None => {}
                    }
                    node = child;
                }
                None => {
                    if wildcard {
                        best = depth + 1;
                    }
                    break;
                }
            }
        }

        best.max(1)
    }
}

// =============================================================================
// Host Splitting
// =============================================================================

/// A host partitioned into subdomain / registrable label / effective TLD.
///
/// All three are slices of the original host, casing untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostParts<'a> {
    pub subdomain: &'a str,
    pub domain: &'a str,
    pub tld: &'a str,
}

impl HostParts<'_> {
    /// Registrable domain (`domain.tld`), empty unless both parts are present.
    pub fn apex(&self) -> String {
        if self.domain.is_empty() || self.tld.is_empty() {
            String::new()
        } else {
            format!("{}.{}", self.domain, self.tld)
        }
    }
}

/// Split a host using the given suffix list.
///
/// IP literals are not split: the whole host becomes `domain`. A trailing
/// root dot stays on the tld (`example.com.` -> `com.`), and so does the dot
/// of an empty label right before the suffix (`x..com` -> `x`, `.com`).
pub fn split_host<'a>(host: &'a str, list: &SuffixList) -> HostParts<'a> {
    if host.is_empty() {
        return HostParts::default();
    }

    if is_ip_literal(host) {
        return HostParts {
            domain: host,
            ..HostParts::default()
        };
    }

    let body = host.strip_suffix('.').unwrap_or(host);
    if body.is_empty() {
        return HostParts {
            tld: host,
            ..HostParts::default()
        };
    }

    let labels: Vec<&str> = body.split('.').collect();
    let lowered: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();
    let suffix_len = list.suffix_len(lowered.as_slice());

    let tld_idx = labels.len() - suffix_len;
    let tld_start = label_offset(&labels, tld_idx);
    let tld = &host[tld_start..];
    if tld_idx == 0 {
        return HostParts {
            tld,
            ..HostParts::default()
        };
    }

    let domain_start = label_offset(&labels, tld_idx - 1);

    // An empty label before the suffix is not a domain: its dot joins the tld
    if labels[tld_idx - 1].is_empty() {
        return match domain_start {
            0 | 1 => HostParts {
                tld: host,
                ..HostParts::default()
            },
            _ => HostParts {
                subdomain: &host[..domain_start - 1],
                tld: &host[domain_start..],
                ..HostParts::default()
            },
        };
    }

    let domain = &host[domain_start..tld_start - 1];
    match domain_start {
        0 => HostParts {
            domain,
            tld,
            ..HostParts::default()
        },
        // A single empty leading label: keep its dot on the domain
        1 => HostParts {
            domain: &host[..tld_start - 1],
            tld,
            ..HostParts::default()
        },
        _ => HostParts {
            subdomain: &host[..domain_start - 1],
            domain,
            tld,
        },
    }
}

/// Byte offset of label `idx` in the dot-joined host.
#[inline]
fn label_offset(labels: &[&str], idx: usize) -> usize {
    labels[..idx].iter().map(|l| l.len() + 1).sum()
}

fn is_ip_literal(host: &str) -> bool {
    (host.starts_with('[') && host.ends_with(']')) || host.parse::<Ipv4Addr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(host: &str) -> (&str, &str, &str) {
        let parts = split_host(host, SuffixList::builtin());
        (parts.subdomain, parts.domain, parts.tld)
    }

    #[test]
    fn test_longest_match_wins() {
        let list = SuffixList::parse("uk\nco.uk\n");
        let labels = ["sub", "example", "co", "uk"];
        assert_eq!(list.longest_suffix(&labels), ["co", "uk"]);
        assert_eq!(list.longest_suffix(&["example", "uk"]), ["uk"]);
    }

    #[test]
    fn test_fallback_to_last_label() {
        let list = SuffixList::parse("com\n");
        assert_eq!(list.longest_suffix(&["example", "internal"]), ["internal"]);
        assert_eq!(SuffixList::new().longest_suffix(&["a", "b"]), ["b"]);
        let empty: [&str; 0] = [];
        assert!(list.longest_suffix(&empty).is_empty());
    }

    #[test]
    fn test_wildcard_rules() {
        let list = SuffixList::parse("ck\n*.ck\n!www.ck\n");
        assert_eq!(list.longest_suffix(&["shop", "foo", "ck"]), ["foo", "ck"]);
        // Exception overrides the wildcard
        assert_eq!(list.longest_suffix(&["www", "ck"]), ["ck"]);
        assert_eq!(list.longest_suffix(&["a", "www", "ck"]), ["ck"]);
    }

    #[test]
    fn test_wildcard_and_literal_same_length() {
        let list = SuffixList::parse("jp\nkobe.jp\n*.kobe.jp\nxyz.kobe.jp\nabc.xyz.kobe.jp\n");
        assert_eq!(list.longest_suffix(&["a", "xyz", "kobe", "jp"]), ["xyz", "kobe", "jp"]);
        assert_eq!(list.longest_suffix(&["a", "other", "kobe", "jp"]), ["other", "kobe", "jp"]);
        assert_eq!(
            list.longest_suffix(&["a", "abc", "xyz", "kobe", "jp"]),
            ["abc", "xyz", "kobe", "jp"]
        );
    }

    #[test]
    fn test_parse_skips_comments_and_bad_rules() {
        let list = SuffixList::parse("// comment\n\ncom  trailing words\nfoo.*.bar\n!solo\n.bad\n");
        assert_eq!(list.len(), 1);
        assert!(!SuffixList::new().insert("a..b"));
    }

    #[test]
    fn test_split_simple() {
        assert_eq!(split("example.com"), ("", "example", "com"));
        assert_eq!(split("api.example.com"), ("api", "example", "com"));
        assert_eq!(split("v2.api.example.com"), ("v2.api", "example", "com"));
    }

    #[test]
    fn test_split_multi_label_suffix() {
        assert_eq!(split("example.co.uk"), ("", "example", "co.uk"));
        assert_eq!(split("sub.example.co.uk"), ("sub", "example", "co.uk"));
        assert_eq!(split("isro.gov.in"), ("", "isro", "gov.in"));
    }

    #[test]
    fn test_split_host_is_suffix() {
        assert_eq!(split("co.uk"), ("", "", "co.uk"));
        assert_eq!(split("com"), ("", "", "com"));
        assert_eq!(split("localhost"), ("", "", "localhost"));
        assert_eq!(split(""), ("", "", ""));
    }

    #[test]
    fn test_split_preserves_case() {
        assert_eq!(split("WWW.Example.CO.UK"), ("WWW", "Example", "CO.UK"));
    }

    #[test]
    fn test_split_ip_literals() {
        assert_eq!(split("192.168.0.1"), ("", "192.168.0.1", ""));
        assert_eq!(split("[::1]"), ("", "[::1]", ""));
    }

    #[test]
    fn test_split_root_dot() {
        assert_eq!(split("www.example.com."), ("www", "example", "com."));
    }

    #[test]
    fn test_split_reconstructs_host() {
        let hosts = [
            "a.b.c.example.com",
            "x.example.co.uk",
            "example.com",
            "shop.city.kawasaki.jp",
            "x..com",
            ".com",
            "..",
            "...",
            ".",
            ".example.com",
            "a..example.com",
            "a..b..com",
            "x..com.",
            "example.com..",
        ];
        for host in hosts {
            let parts = split_host(host, SuffixList::builtin());
            let joined: Vec<&str> = [parts.subdomain, parts.domain, parts.tld]
                .into_iter()
                .filter(|p| !p.is_empty())
                .collect();
            assert_eq!(joined.join("."), host);
        }
    }

    #[test]
    fn test_split_empty_labels() {
        assert_eq!(split("x..com"), ("x", "", ".com"));
        assert_eq!(split(".com"), ("", "", ".com"));
        assert_eq!(split(".."), ("", "", ".."));
        assert_eq!(split(".example.com"), ("", ".example", "com"));
        assert_eq!(split("a..example.com"), ("a.", "example", "com"));
        assert_eq!(split_host("x..com", SuffixList::builtin()).apex(), "");
    }

    #[test]
    fn test_apex() {
        let parts = split_host("sub.example.com", SuffixList::builtin());
        assert_eq!(parts.apex(), "example.com");
        assert_eq!(split_host("co.uk", SuffixList::builtin()).apex(), "");
    }
}
