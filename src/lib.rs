//! Pluggable request security profiles.
//!
//! Named profiles (IP allow lists, IP deny lists, signed CSRF tokens) are
//! registered once, then combined per route with an operator:
//!
//! ```text
//! RoutePolicy ──▶ PolicyEngine ──▶ ProfileRegistry ──▶ Profile::validate (concurrent)
//!                      │                                     │
//!                      ▼                                     ▼
//!              allow / GuardError  ◀──  Operator (at-least-one / for-every)
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod observability;
pub mod policy;
pub mod profile;
pub mod token;

pub use config::schema::GuardConfig;
pub use error::{GuardError, GuardResult};
pub use policy::{Operator, PolicyEngine, RoutePolicy};
pub use profile::{
    Capability, IssuanceContext, Profile, ProfileKind, ProfileRegistry, RequestContext, SessionId,
    Subject,
};
