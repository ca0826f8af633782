//! Demo host for the profile guard.
//!
//! Loads the configuration named by `GUARD_CONFIG` (default `guard.toml`),
//! registers its profiles and serves every `[[routes]]` entry behind the
//! matching guard:
//!
//! ```text
//! GET  /public                  unguarded
//! ANY  /routes/{name}           IP guard for pure IP routes, request guard otherwise
//! GET  /csrf/{profile}          issues a token in `x-csrf-token`
//! ```
//!
//! The listen address comes from `GUARD_LISTEN` (default `0.0.0.0:3000`).
//! An `x-session-id` request header stands in for an authentication layer.

use axum::{
    body::Body,
    extract::Request,
    middleware::{from_fn, from_fn_with_state, Next},
    response::Response,
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use profile_guard::config::watcher::{apply_updates, ConfigWatcher};
use profile_guard::config::{self, load_config, GuardConfig};
use profile_guard::http::{csrf_guard_middleware, csrf_issue_middleware, ip_guard_middleware, GuardState};
use profile_guard::observability::{logging, metrics};
use profile_guard::profile::configured::build_registry;
use profile_guard::{PolicyEngine, ProfileKind, RoutePolicy, SessionId};

const DEMO_SESSION_HEADER: &str = "x-session-id";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = PathBuf::from(std::env::var("GUARD_CONFIG").unwrap_or_else(|_| "guard.toml".into()));
    let config = load_config(&path)?;

    logging::init_logging(&config.observability);
    tracing::info!(path = ?path, profiles = config.profiles.len(), routes = config.routes.len(), "Configuration loaded");

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shared = config::shared(config);
    let engine = Arc::new(PolicyEngine::new(build_registry(&shared)?));

    let (watcher, updates) = ConfigWatcher::new(&path);
    let _watcher = watcher.run()?;
    tokio::spawn(apply_updates(shared.clone(), updates));

    let app = build_router(&shared.load(), engine);

    let bind = std::env::var("GUARD_LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = TcpListener::bind(&bind).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(config: &GuardConfig, engine: Arc<PolicyEngine>) -> Router {
    let trust = config.client_ip.trust_forwarded_headers;
    let mut router = Router::new().route("/public", get(echo));

    for route in &config.routes {
        let policy = RoutePolicy::from(route);
        let all_ip = route.profiles.iter().all(|name| {
            engine.registry().get(name).is_some_and(|p| p.kind().is_ip_list())
        });
        let state = GuardState::new(engine.clone(), policy).with_forwarded_headers(trust);

        let handler = if all_ip {
            any(echo).layer(from_fn_with_state(state, ip_guard_middleware))
        } else {
            any(echo).layer(from_fn_with_state(state, csrf_guard_middleware))
        };
        router = router.route(&format!("/routes/{}", route.name), handler);
        tracing::info!(route = %route.name, profiles = %route.profiles.join(", "), operator = %route.operator, "Route guarded");
    }

    for profile in config.profiles.iter().filter(|p| p.settings.kind() == ProfileKind::SignedToken) {
        let state = GuardState::new(engine.clone(), RoutePolicy::csrf_issue(profile.name.clone()))
            .with_forwarded_headers(trust);
        router = router.route(
            &format!("/csrf/{}", profile.name),
            get(session_payload).layer(from_fn_with_state(state, csrf_issue_middleware)),
        );
    }

    router.layer(from_fn(demo_session))
}

async fn echo(req: Request<Body>) -> Json<Value> {
    Json(json!({ "method": req.method().as_str(), "path": req.uri().path() }))
}

async fn session_payload(req: Request<Body>) -> Json<Value> {
    let session = req.extensions().get::<SessionId>().map(|s| s.0.clone());
    Json(json!({ "sessionId": session }))
}

/// Attach the `x-session-id` header as the request's session identity.
async fn demo_session(mut req: Request<Body>, next: Next) -> Response {
    let session = req
        .headers()
        .get(DEMO_SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| SessionId(s.to_string()));
    if let Some(session) = session {
        req.extensions_mut().insert(session);
    }
    next.run(req).await
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
    }
    tracing::info!("Shutdown signal received");
}
