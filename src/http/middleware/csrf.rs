//! CSRF token middleware.
//!
//! # Responsibilities
//! - Verify `x-csrf-token` on state-changing routes
//! - Issue a fresh token on the response of issuing routes
//!
//! # Design Decisions
//! - Issuance runs after the handler so the payload can supply the session
//! - Only successful responses get a token; errors pass through untouched

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use super::GuardState;
use crate::http::request::{request_context, CSRF_TOKEN_HEADER};
use crate::profile::{IssuanceContext, Subject};

/// Largest response body buffered to read the issuance session from.
pub const MAX_PAYLOAD_BYTES: usize = 2 * 1024 * 1024;

/// Reject requests whose token no profile of the route accepts.
pub async fn csrf_guard_middleware(
    State(state): State<GuardState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ctx = request_context(&req, state.trust_forwarded_headers);

    match state.engine.enforce(&state.policy, &Subject::Request(&ctx)).await {
        Ok(()) => next.run(req).await,
        Err(e) => e.into_response(),
    }
}

/// Attach a token issued by the route's single profile to the response.
pub async fn csrf_issue_middleware(
    State(state): State<GuardState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ctx = request_context(&req, state.trust_forwarded_headers);
    let response = next.run(req).await;

    if state.policy.is_empty() || !response.status().is_success() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_PAYLOAD_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to buffer response for token issuance");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Response too large").into_response();
        }
    };
    let payload = serde_json::from_slice::<Value>(&bytes).ok();

    let issuance = IssuanceContext::from_request(&ctx).with_payload(payload.as_ref());
    let token = match state.engine.issue_token(state.policy.profiles(), &issuance).await {
        Ok(token) => token,
        Err(e) => return e.into_response(),
    };

    match HeaderValue::from_str(&token) {
        Ok(value) => {
            parts.headers.insert(CSRF_TOKEN_HEADER, value);
        }
        Err(_) => {
            tracing::error!("Issued token is not a valid header value");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
        }
    }

    Response::from_parts(parts, Body::from(bytes))
}
