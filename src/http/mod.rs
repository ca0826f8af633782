//! HTTP host glue for axum applications.
//!
//! # Data Flow
//! ```text
//! Request
//!     → request.rs (client address, session identity, headers)
//!     → middleware/ (enforce or issue per RoutePolicy)
//!     → response.rs (GuardError → 403 / 500 JSON)
//! ```

pub mod middleware;
pub mod request;
pub mod response;

pub use middleware::{
    csrf_guard_middleware, csrf_issue_middleware, ip_guard_middleware, GuardState,
};
pub use request::{client_ip, request_context, CSRF_TOKEN_HEADER};
pub use response::ErrorBody;
