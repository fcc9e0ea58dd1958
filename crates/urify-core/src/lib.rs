//! urify Core Library
//!
//! This crate dissects URLs into structured components and filters them by
//! those components.
//!
//! # Architecture
//!
//! Every operation is a pure function of its inputs. The only shared state is
//! the bundled public suffix rule set, built once on first use and never
//! mutated, so a `&SuffixList` can be handed to any number of workers.
//!
//! # Modules
//!
//! - `psl`: Public Suffix List trie and host splitting
//! - `url`: Best-effort URL dissection and query parsing
//! - `filter`: Component filters with allow/deny and any/all semantics
//! - `project`: Output projections (keys, values, params, path, apex, fqdn, json)
//! - `types`: Shared type definitions

pub mod filter;
pub mod project;
pub mod psl;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use filter::{FilterCategory, FilterError, FilterFlags, FilterSpec};
pub use project::{project, Mode, ProjectError, Projection};
pub use psl::{split_host, HostParts, PslError, SuffixList};
pub use types::{DissectedUrl, QueryPair};
pub use url::{dissect, dissect_with};
