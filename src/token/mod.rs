//! Signed CSRF token subsystem.
//!
//! # Data Flow
//! ```text
//! Issuance:
//!     session id + now_millis + nonce
//!     → codec.rs (compose message)
//!     → signer.rs (HMAC-SHA256, hex)
//!     → "<hmac>.<message>"
//!
//! Verification:
//!     token → codec.rs (structural parse, reject early)
//!           → signer.rs (constant-time HMAC check over the exact message slice)
//!           → caller compares embedded session id with the current one
//! ```
//!
//! # Design Decisions
//! - Stateless: tokens are verified by re-derivation, never looked up
//! - Nonce makes every issued token distinct for the same session
//! - Expiry is not implied by the format; profiles opt in

pub mod codec;
pub mod signer;

pub use codec::{parse, ParsedToken};
