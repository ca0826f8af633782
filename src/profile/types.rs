//! Inputs handed to profiles.

use axum::http::HeaderMap;
use serde_json::Value;
use std::net::IpAddr;

use crate::http::request::CSRF_TOKEN_HEADER;

/// Session identity attached to a request by the upstream authentication layer.
///
/// The guard only reads it; inserting it is the host's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

/// Request-shaped view used by token profiles (and by IP profiles when no
/// bare address is given).
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    headers: HeaderMap,
    client_ip: Option<IpAddr>,
    session_id: Option<String>,
}

impl RequestContext {
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }

    pub fn with_client_ip(mut self, ip: Option<IpAddr>) -> Self {
        self.client_ip = ip;
        self
    }

    pub fn with_session_id(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text; `None` when absent or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn client_ip(&self) -> Option<IpAddr> {
        self.client_ip
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Token carried in the `x-csrf-token` header.
    pub fn csrf_token(&self) -> Option<&str> {
        self.header(CSRF_TOKEN_HEADER)
    }
}

/// The argument every profile in one decision is validated against.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    /// A client address, e.g. `"192.168.0.1"`.
    Address(&'a str),
    /// A whole inbound request.
    Request(&'a RequestContext),
}

impl Subject<'_> {
    /// Client address carried by the subject, if any.
    pub fn client_address(&self) -> Option<String> {
        match self {
            Subject::Address(address) => Some((*address).to_string()),
            Subject::Request(req) => req.client_ip().map(|ip| ip.to_string()),
        }
    }
}

/// What a token is issued from: the request that asked for it and,
/// optionally, the payload being returned to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssuanceContext<'a> {
    pub request: Option<&'a RequestContext>,
    pub payload: Option<&'a Value>,
}

impl<'a> IssuanceContext<'a> {
    pub fn from_request(request: &'a RequestContext) -> Self {
        Self {
            request: Some(request),
            payload: None,
        }
    }

    pub fn from_payload(payload: &'a Value) -> Self {
        Self {
            request: None,
            payload: Some(payload),
        }
    }

    pub fn with_payload(mut self, payload: Option<&'a Value>) -> Self {
        self.payload = payload;
        self
    }
}
