//! IPv4 / CIDR range matching.
//!
//! # Responsibilities
//! - Validate `a.b.c.d` and `a.b.c.d/n` literals (0 <= n <= 32)
//! - Test address membership by prefix masking
//!
//! # Design Decisions
//! - IPv4 only; anything IPv6-shaped is rejected as a range and never matches
//! - A bare address is a /32
//! - Octets and prefixes with leading zeros are rejected

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// A contiguous IPv4 block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    network: u32,
    prefix_len: u8,
}

/// Returned when a string is not an IPv4 address or CIDR block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRange(pub String);

impl fmt::Display for InvalidRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not an IPv4 address or CIDR block: {:?}", self.0)
    }
}

impl std::error::Error for InvalidRange {}

impl Ipv4Range {
    /// Build a range, masking off host bits of `addr`.
    pub fn new(addr: Ipv4Addr, prefix_len: u8) -> Option<Self> {
        if prefix_len > 32 {
            return None;
        }
        Some(Self {
            network: u32::from(addr) & mask(prefix_len),
            prefix_len,
        })
    }

    /// Lowest address in the block.
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.network)
    }

    /// Highest address in the block.
    pub fn broadcast(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.network | !mask(self.prefix_len))
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Returns true if `addr` lies inside the block, bounds included.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & mask(self.prefix_len) == self.network
    }
}

impl FromStr for Ipv4Range {
    type Err = InvalidRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidRange(s.to_string());

        let (addr, prefix) = match s.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (s, None),
        };

        let addr: Ipv4Addr = addr.parse().map_err(|_| invalid())?;
        let prefix_len = match prefix {
            Some(p) => parse_prefix(p).ok_or_else(invalid)?,
            None => 32,
        };

        Self::new(addr, prefix_len).ok_or_else(invalid)
    }
}

impl fmt::Display for Ipv4Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix_len)
    }
}

fn mask(prefix_len: u8) -> u32 {
    match prefix_len {
        0 => 0,
        n => u32::MAX << (32 - u32::from(n)),
    }
}

fn parse_prefix(p: &str) -> Option<u8> {
    let well_formed = matches!(p.len(), 1 | 2)
        && p.bytes().all(|b| b.is_ascii_digit())
        && !(p.len() == 2 && p.starts_with('0'));
    if !well_formed {
        return None;
    }
    p.parse::<u8>().ok().filter(|n| *n <= 32)
}

/// Returns true if `s` is a bare IPv4 address or an IPv4 CIDR block.
pub fn is_valid_ipv4_or_cidr(s: &str) -> bool {
    s.parse::<Ipv4Range>().is_ok()
}

/// Returns true if `address` falls inside `range`.
///
/// Malformed input on either side never matches. Callers that must surface
/// bad ranges parse with [`Ipv4Range::from_str`] first.
pub fn matches(range: &str, address: &str) -> bool {
    match (range.parse::<Ipv4Range>(), address.parse::<Ipv4Addr>()) {
        (Ok(range), Ok(addr)) => range.contains(addr),
        _ => false,
    }
}
