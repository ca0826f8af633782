//! IP allow/deny list middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::GuardState;
use crate::error::GuardError;
use crate::http::request::request_context;
use crate::profile::Subject;

/// Enforce the route's IP policy against the client address.
pub async fn ip_guard_middleware(
    State(state): State<GuardState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if state.policy.is_empty() {
        return next.run(req).await;
    }

    let ctx = request_context(&req, state.trust_forwarded_headers);
    let Some(address) = ctx.client_ip().map(|ip| ip.to_string()) else {
        return GuardError::MissingClientIp.into_response();
    };

    match state.engine.enforce(&state.policy, &Subject::Address(&address)).await {
        Ok(()) => next.run(req).await,
        Err(e) => e.into_response(),
    }
}
