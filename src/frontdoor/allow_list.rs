//! Allow-list matching for hosts and edge identifiers.
//!
//! # Responsibilities
//! - Hold the configured hosts / identifiers in configured order
//! - Case-insensitive exact membership checks
//! - Strip port suffixes before comparing hosts
//!
//! # Design Decisions
//! - Hosts are parsed as URI authorities; the port is ignored on both sides
//! - A candidate that is not a valid authority never matches
//! - Identifier comparisons never interpret `:` (ids are opaque)
//! - An empty list cannot be constructed

use axum::http::uri::Authority;
use thiserror::Error;

/// Error constructing an allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllowListError {
    #[error("allow-list must contain at least one entry")]
    Empty,

    #[error("not a valid host: {0}")]
    InvalidHost(String),
}

/// How candidates and entries are normalized before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Host,
    Identifier,
}

/// An ordered, de-duplicated, non-empty allow-list.
#[derive(Debug, Clone)]
pub struct AllowList {
    kind: EntryKind,
    /// Entries as configured (trimmed), used for display and probe stamping.
    entries: Vec<String>,
    /// Entries in comparison form.
    keys: Vec<String>,
}

impl AllowList {
    /// Build a hostname allow-list. Entries may carry a port; it is ignored.
    pub fn hosts<I, S>(entries: I) -> Result<Self, AllowListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(EntryKind::Host, entries)
    }

    /// Build an opaque identifier allow-list.
    pub fn identifiers<I, S>(entries: I) -> Result<Self, AllowListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(EntryKind::Identifier, entries)
    }

    fn build<I, S>(kind: EntryKind, entries: I) -> Result<Self, AllowListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self {
            kind,
            entries: Vec::new(),
            keys: Vec::new(),
        };

        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            let key = match kind {
                EntryKind::Host => {
                    normalize_host(entry).ok_or_else(|| AllowListError::InvalidHost(entry.to_string()))?
                }
                EntryKind::Identifier => entry.to_ascii_lowercase(),
            };
            if list.keys.contains(&key) {
                continue;
            }
            list.entries.push(entry.to_string());
            list.keys.push(key);
        }

        if list.entries.is_empty() {
            return Err(AllowListError::Empty);
        }
        Ok(list)
    }

    /// Returns true if `candidate` is on the list.
    pub fn matches(&self, candidate: &str) -> bool {
        let candidate = match self.kind {
            EntryKind::Host => match normalize_host(candidate) {
                Some(host) => host,
                None => return false,
            },
            EntryKind::Identifier => candidate.trim().to_ascii_lowercase(),
        };
        !candidate.is_empty() && self.keys.contains(&candidate)
    }

    /// The first configured entry.
    pub fn first(&self) -> &str {
        // Construction guarantees at least one entry.
        &self.entries[0]
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Host part of `value`, lowercased and without its port.
///
/// `None` when `value` is not a valid URI authority, carries userinfo or has
/// an empty host. Bracketed IPv6 literals keep their brackets.
pub fn normalize_host(value: &str) -> Option<String> {
    let value = value.trim();
    if value.contains('@') {
        return None;
    }
    let authority: Authority = value.parse().ok()?;
    let host = authority.host();
    // A trailing `:` must carry a numeric port.
    if host.is_empty() || (host.len() != authority.as_str().len() && authority.port_u16().is_none()) {
        return None;
    }
    Some(host.to_ascii_lowercase())
}
