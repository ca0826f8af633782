//! Route guard middleware.
//!
//! # Data Flow
//! ```text
//! Request
//!     → ip_guard.rs / csrf.rs (build RequestContext, enforce RoutePolicy)
//!     → denial? GuardError response (403 / 500)
//!     → handler
//!     → csrf.rs issue (buffer payload, sign, set x-csrf-token)
//! ```
//!
//! Each middleware is installed per route with
//! `axum::middleware::from_fn_with_state(GuardState, ..)`.

pub mod csrf;
pub mod ip_guard;

use std::sync::Arc;

use crate::policy::{PolicyEngine, RoutePolicy};

pub use csrf::{csrf_guard_middleware, csrf_issue_middleware};
pub use ip_guard::ip_guard_middleware;

/// State handed to a guard middleware: the engine and the route's policy.
#[derive(Debug, Clone)]
pub struct GuardState {
    pub engine: Arc<PolicyEngine>,
    pub policy: RoutePolicy,
    pub trust_forwarded_headers: bool,
}

impl GuardState {
    pub fn new(engine: Arc<PolicyEngine>, policy: RoutePolicy) -> Self {
        Self {
            engine,
            policy,
            trust_forwarded_headers: false,
        }
    }

    /// Honour `X-Forwarded-For` / `X-Real-IP` for this route.
    pub fn with_forwarded_headers(mut self, trust: bool) -> Self {
        self.trust_forwarded_headers = trust;
        self
    }
}
