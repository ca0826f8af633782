//! Network address subsystem.
//!
//! # Data Flow
//! ```text
//! Profile-supplied range strings ("10.0.0.0/8", "192.168.0.1")
//!     → cidr.rs (parse to Ipv4Range, reject malformed)
//!     → membership test against the client address
//! ```
//!
//! # Design Decisions
//! - Pure functions, no allocation on the match path
//! - IPv6 is a documented limitation, not a silent pass

pub mod cidr;

pub use cidr::{is_valid_ipv4_or_cidr, matches, InvalidRange, Ipv4Range};
