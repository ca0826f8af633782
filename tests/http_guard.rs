//! Guard middleware driven through an axum router.

use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower::ServiceExt;

use common::TestRequest;
use profile_guard::http::{
    csrf_guard_middleware, csrf_issue_middleware, ip_guard_middleware, GuardState, CSRF_TOKEN_HEADER,
};
use profile_guard::{Operator, RoutePolicy};

mod common;

fn app(trust_forwarded: bool) -> Router {
    let engine = common::engine();
    let state = |policy: RoutePolicy| {
        GuardState::new(engine.clone(), policy).with_forwarded_headers(trust_forwarded)
    };

    Router::new()
        .route(
            "/office",
            get(|| async { "office" })
                .layer(from_fn_with_state(state(RoutePolicy::ip_allow_list(["office", "vpn"])), ip_guard_middleware)),
        )
        .route(
            "/public",
            get(|| async { "public" })
                .layer(from_fn_with_state(state(RoutePolicy::ip_deny_list(["blocked", "abuse"])), ip_guard_middleware)),
        )
        .route(
            "/open",
            get(|| async { "open" }).layer(from_fn_with_state(state(RoutePolicy::default()), ip_guard_middleware)),
        )
        .route(
            "/token",
            get(|| async { Json(json!({ "ok": true })) })
                .layer(from_fn_with_state(state(RoutePolicy::csrf_issue("csrf")), csrf_issue_middleware)),
        )
        .route(
            "/login",
            post(|| async { Json(json!({ "user": { "id": "u-7" } })) })
                .layer(from_fn_with_state(state(RoutePolicy::csrf_issue("csrf-payload")), csrf_issue_middleware)),
        )
        .route(
            "/login-unicode",
            post(|| async { Json(json!({ "user": { "id": "jos\u{e9}" } })) })
                .layer(from_fn_with_state(state(RoutePolicy::csrf_issue("csrf-payload")), csrf_issue_middleware)),
        )
        .route(
            "/submit",
            post(|| async { "accepted" })
                .layer(from_fn_with_state(state(RoutePolicy::csrf(["csrf", "csrf-payload"])), csrf_guard_middleware)),
        )
        .route(
            "/office-submit",
            post(|| async { "accepted" }).layer(from_fn_with_state(
                state(RoutePolicy::new(["office", "csrf"], Operator::ForEvery)),
                csrf_guard_middleware,
            )),
        )
        .route(
            "/misissued",
            get(|| async { "x" })
                .layer(from_fn_with_state(state(RoutePolicy::csrf_issue("office")), csrf_issue_middleware)),
        )
        .route(
            "/misrouted",
            get(|| async { "x" })
                .layer(from_fn_with_state(state(RoutePolicy::ip_allow_list(["ghost"])), ip_guard_middleware)),
        )
}

async fn issue(app: &Router, uri: &str, request: TestRequest) -> String {
    let response = app.clone().oneshot(request.build()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "issuing from {uri}");
    response
        .headers()
        .get(CSRF_TOKEN_HEADER)
        .expect("token header set")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_allow_list_route() {
    let app = app(false);

    let response = app
        .clone()
        .oneshot(TestRequest::get("/office").peer("192.168.0.1").build())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(TestRequest::get("/office").peer("10.8.200.1").build())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(TestRequest::get("/office").peer("8.8.8.8").build())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = common::body_json(response).await;
    assert_eq!(body["statusCode"], 403);
    assert_eq!(body["message"], "Forbidden IP address: 8.8.8.8, profile name: office, vpn");
}

#[tokio::test]
async fn test_deny_list_route() {
    let app = app(false);

    for (peer, expected) in [
        ("8.8.8.8", StatusCode::OK),
        ("192.168.0.2", StatusCode::FORBIDDEN),
        ("10.8.1.1", StatusCode::FORBIDDEN),
    ] {
        let response = app
            .clone()
            .oneshot(TestRequest::get("/public").peer(peer).build())
            .await
            .unwrap();
        assert_eq!(response.status(), expected, "peer {peer}");
    }
}

#[tokio::test]
async fn test_forwarded_headers() {
    let request = || {
        TestRequest::get("/office")
            .peer("8.8.8.8")
            .header("x-forwarded-for", "192.168.0.1, 8.8.8.8")
    };

    let response = app(true).oneshot(request().build()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app(false).oneshot(request().build()).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_client_ip() {
    let response = app(false)
        .oneshot(TestRequest::get("/office").build())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = common::body_json(response).await;
    assert_eq!(body["message"], "Missing client IP address in request");
}

#[tokio::test]
async fn test_empty_policy_passes_through() {
    let response = app(false)
        .oneshot(TestRequest::get("/open").build())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_csrf_issue_then_verify() {
    let app = app(false);
    let token = issue(&app, "/token", TestRequest::get("/token").session("alice")).await;

    let response = app
        .clone()
        .oneshot(TestRequest::post("/submit").session("alice").token(&token).build())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(TestRequest::post("/submit").session("bob").token(&token).build())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = common::body_json(response).await;
    assert_eq!(body["message"], "Invalid CSRF token, profile name: csrf, csrf-payload");

    let response = app
        .oneshot(TestRequest::post("/submit").session("alice").build())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_csrf_issue_from_payload() {
    let app = app(false);
    let token = issue(&app, "/login", TestRequest::post("/login")).await;

    let response = app
        .clone()
        .oneshot(TestRequest::post("/submit").session("u-7").token(&token).build())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut forged = token.clone();
    let first = forged.remove(0);
    forged.insert(0, if first == 'a' { 'b' } else { 'a' });
    let response = app
        .oneshot(TestRequest::post("/submit").session("u-7").token(&forged).build())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_issue_without_session() {
    let response = app(false)
        .oneshot(TestRequest::get("/token").build())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.headers().get(CSRF_TOKEN_HEADER).is_none());
}

#[tokio::test]
async fn test_issue_with_non_ascii_session_is_forbidden() {
    let response = app(false)
        .oneshot(TestRequest::post("/login-unicode").build())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.headers().get(CSRF_TOKEN_HEADER).is_none());
}

#[tokio::test]
async fn test_mixed_policy_needs_both() {
    let app = app(false);
    let token = issue(&app, "/token", TestRequest::get("/token").session("alice")).await;

    let response = app
        .clone()
        .oneshot(
            TestRequest::post("/office-submit")
                .peer("127.0.0.1")
                .session("alice")
                .token(&token)
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            TestRequest::post("/office-submit")
                .peer("8.8.8.8")
                .session("alice")
                .token(&token)
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = common::body_json(response).await;
    assert_eq!(body["message"], "Forbidden, profile name: office, csrf");
}

#[tokio::test]
async fn test_misconfiguration_is_server_error() {
    let app = app(false);

    let response = app
        .clone()
        .oneshot(TestRequest::get("/misissued").session("alice").build())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = app
        .oneshot(TestRequest::get("/misrouted").peer("127.0.0.1").build())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = common::body_json(response).await;
    assert_eq!(body["message"], "Internal Server Error");
}
