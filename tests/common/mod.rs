//! Shared fixtures for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Method, Request, Response};
use std::net::SocketAddr;
use std::sync::Arc;

use profile_guard::config::{self, parse_config, SharedConfig};
use profile_guard::http::CSRF_TOKEN_HEADER;
use profile_guard::profile::configured::build_registry;
use profile_guard::{PolicyEngine, SessionId};

/// Profiles used across the integration tests.
pub const CONFIG: &str = r#"
[client_ip]
trust_forwarded_headers = true

[[profiles]]
name = "office"
kind = "allow-list"
ranges = ["127.0.0.1", "192.168.0.1", "192.168.0.2"]

[[profiles]]
name = "vpn"
kind = "allow-list"
ranges = ["10.8.0.0/16"]

[[profiles]]
name = "blocked"
kind = "deny-list"
ranges = ["192.168.0.2", "172.16.0.0/12"]

[[profiles]]
name = "abuse"
kind = "deny-list"
ranges = ["10.8.1.0/24"]

[[profiles]]
name = "csrf"
kind = "signed-token"
secret = "secretKey"

[[profiles]]
name = "csrf-payload"
kind = "signed-token"
secret = "otherKey"
issuance_session_pointer = "/user/id"
"#;

pub fn shared_config() -> SharedConfig {
    config::shared(parse_config(CONFIG).expect("fixture config is valid"))
}

pub fn engine_with(config: &SharedConfig) -> Arc<PolicyEngine> {
    Arc::new(PolicyEngine::new(build_registry(config).expect("fixture registry builds")))
}

pub fn engine() -> Arc<PolicyEngine> {
    engine_with(&shared_config())
}

/// Request builder with the pieces a guard looks at.
#[derive(Default)]
pub struct TestRequest {
    method: Option<Method>,
    uri: String,
    peer: Option<SocketAddr>,
    session: Option<String>,
    token: Option<String>,
    headers: Vec<(&'static str, String)>,
}

impl TestRequest {
    pub fn get(uri: &str) -> Self {
        Self {
            method: Some(Method::GET),
            uri: uri.to_string(),
            ..Default::default()
        }
    }

    pub fn post(uri: &str) -> Self {
        Self {
            method: Some(Method::POST),
            uri: uri.to_string(),
            ..Default::default()
        }
    }

    pub fn peer(mut self, ip: &str) -> Self {
        self.peer = Some(format!("{ip}:40000").parse().expect("valid peer"));
        self
    }

    pub fn session(mut self, id: &str) -> Self {
        self.session = Some(id.to_string());
        self
    }

    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    pub fn build(self) -> Request<Body> {
        let mut builder = Request::builder()
            .method(self.method.unwrap_or(Method::GET))
            .uri(self.uri);
        if let Some(token) = &self.token {
            builder = builder.header(CSRF_TOKEN_HEADER, token);
        }
        for (name, value) in &self.headers {
            builder = builder.header(*name, value);
        }

        let mut req = builder.body(Body::empty()).expect("valid request");
        if let Some(peer) = self.peer {
            req.extensions_mut().insert(ConnectInfo(peer));
        }
        if let Some(session) = self.session {
            req.extensions_mut().insert(SessionId(session));
        }
        req
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is JSON")
}
