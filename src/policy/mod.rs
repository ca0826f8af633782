//! Policy decision subsystem.
//!
//! # Data Flow
//! ```text
//! RoutePolicy (profile names + operator)
//!     → engine.rs (empty → allow; resolve names via registry)
//!     → aggregator.rs (validate all profiles concurrently, join)
//!     → operator.rs (AT_LEAST_ONE / FOR_EVERY reduction)
//!     → allow, or a typed denial naming the profiles
//! ```
//!
//! # Design Decisions
//! - Unknown profile names are configuration errors, never denials
//! - Unknown operators cannot reach the aggregator; they fail at parse time
//! - Stateless per request; the only shared state is the frozen registry

pub mod aggregator;
pub mod engine;
pub mod operator;

pub use aggregator::apply_profiles;
pub use engine::{PolicyEngine, RoutePolicy};
pub use operator::Operator;
