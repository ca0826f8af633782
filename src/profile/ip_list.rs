//! Allow/deny list membership.
//!
//! # Responsibilities
//! - Validate every entry of a profile's list before matching
//! - OR across entries within one profile
//!
//! # Design Decisions
//! - A malformed entry is a configuration error naming the entry, never skipped
//! - Non-IPv4 client addresses match nothing

use async_trait::async_trait;
use std::net::Ipv4Addr;

use super::{AllowListProfile, DenyListProfile};
use crate::error::{GuardError, GuardResult};
use crate::net::Ipv4Range;

/// Parse all entries, failing on the first malformed one.
pub fn parse_ranges(profile: &str, entries: &[String]) -> GuardResult<Vec<Ipv4Range>> {
    entries
        .iter()
        .map(|entry| {
            entry.parse::<Ipv4Range>().map_err(|_| GuardError::InvalidRange {
                profile: profile.to_string(),
                range: entry.clone(),
            })
        })
        .collect()
}

/// Returns true if `address` is inside any entry.
pub fn list_contains(profile: &str, entries: &[String], address: &str) -> GuardResult<bool> {
    let ranges = parse_ranges(profile, entries)?;

    let Ok(addr) = address.parse::<Ipv4Addr>() else {
        tracing::debug!(profile = %profile, address = %address, "Client address is not IPv4, no entry matches");
        return Ok(false);
    };

    Ok(ranges.iter().any(|range| range.contains(addr)))
}

/// Allow-list verdict: true iff some entry matches. Empty list allows nobody.
pub fn allow_verdict(profile: &str, entries: &[String], address: &str) -> GuardResult<bool> {
    list_contains(profile, entries, address)
}

/// Deny-list verdict: false iff some entry matches. Empty list denies nobody.
pub fn deny_verdict(profile: &str, entries: &[String], address: &str) -> GuardResult<bool> {
    list_contains(profile, entries, address).map(|hit| !hit)
}

/// Allow list fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct StaticAllowList {
    entries: Vec<String>,
}

impl StaticAllowList {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl AllowListProfile for StaticAllowList {
    async fn allow_list(&self) -> GuardResult<Vec<String>> {
        Ok(self.entries.clone())
    }
}

/// Deny list fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct StaticDenyList {
    entries: Vec<String>,
}

impl StaticDenyList {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl DenyListProfile for StaticDenyList {
    async fn deny_list(&self) -> GuardResult<Vec<String>> {
        Ok(self.entries.clone())
    }
}
