//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! profile, policy and token code produce:
//!     → logging.rs (structured log events, one per verdict)
//!     → metrics.rs (verdict, decision and token counters)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Every profile verdict is logged at debug, denials at warn
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
