//! End-to-end tests for the model endpoint through the axum router.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use modelgate_core::{FilterError, OperationError};
use modelgate_gateway::app_state::AppState;
use modelgate_gateway::auth::StaticTokenGuard;
use modelgate_gateway::config;
use modelgate_gateway::dispatch::{filter_fn, InputShape, ModelOperation, ModelRegistry};
use modelgate_gateway::policy::Policy;
use modelgate_gateway::router::build_router;

const TOKEN: &str = "root-token";

const BASE: &str = r#"
version: 1
auth:
  guards:
    admin:
      tokens: ["root-token"]
store:
  models: "user, post"
"#;

fn loopback() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

fn app_from(yaml: &str, peer: SocketAddr) -> Router {
    let cfg = config::load_from_str(yaml).unwrap();
    let state = AppState::new(cfg).unwrap();
    build_router(state).layer(MockConnectInfo(peer))
}

fn app() -> Router {
    app_from(BASE, loopback())
}

fn post(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut b = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(t) = token {
        b = b.header("authorization", format!("Bearer {t}"));
    }
    b.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Counts calls; optionally fails with a fixed message.
struct Recorder {
    calls: Arc<AtomicUsize>,
    fail: Option<&'static str>,
}

#[async_trait]
impl ModelOperation for Recorder {
    async fn call(&self, body: Value) -> Result<Value, OperationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail {
            Some(msg) => Err(OperationError::new(msg)),
            None => Ok(json!({ "echo": body })),
        }
    }
}

/// Router over a recording registry serving `user.findMany` and `user.explode`.
fn recording_app(yaml: &str, peer: SocketAddr, customize: impl FnOnce(modelgate_gateway::policy::PolicyBuilder) -> modelgate_gateway::policy::PolicyBuilder) -> (Router, Arc<AtomicUsize>) {
    let cfg = config::load_from_str(yaml).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut reg = ModelRegistry::new();
    reg.register("user", "findMany", InputShape::Any, Arc::new(Recorder { calls: calls.clone(), fail: None }));
    reg.register("user", "explode", InputShape::Any, Arc::new(Recorder { calls: calls.clone(), fail: Some("boom") }));

    let policy = customize(Policy::builder(&cfg.rest)).build();
    let guard = StaticTokenGuard::from_config(&cfg.auth);
    let state = AppState::from_parts(cfg, policy, Some(Arc::new(reg)), Arc::new(guard));

    (build_router(state).layer(MockConnectInfo(peer)), calls)
}

#[tokio::test]
async fn find_many_with_empty_body_returns_result() {
    let (status, body) = send(app(), post("/v1/orm/findMany/user", Some(TOKEN), "")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn created_records_are_visible_to_later_calls() {
    let app = app();

    let (status, created) = send(
        app.clone(),
        post("/v1/orm/create/user", Some(TOKEN), r#"{"data":{"name":"ada"}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created, json!({ "id": 1, "name": "ada" }));

    let (status, found) = send(
        app,
        post("/v1/orm/findMany/user", Some(TOKEN), r#"{"where":{"name":"ada"}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, json!([{ "id": 1, "name": "ada" }]));
}

#[tokio::test]
async fn operation_error_is_400_with_its_message() {
    let (app, calls) = recording_app(BASE, loopback(), |b| b);
    let (status, body) = send(app, post("/v1/orm/explode/user", Some(TOKEN), "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "boom" }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_model_even_when_allowed() {
    let yaml = format!("{BASE}rest:\n  models: \"user, ghost\"\n");
    let (status, body) = send(
        app_from(&yaml, loopback()),
        post("/v1/orm/findMany/ghost", Some(TOKEN), ""),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Model not found" }));
}

#[tokio::test]
async fn unknown_method_on_known_model() {
    let (status, body) = send(app(), post("/v1/orm/truncate/user", Some(TOKEN), "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Model does not have this method" }));
}

#[tokio::test]
async fn missing_or_wrong_token_is_401() {
    let (status, body) = send(app(), post("/v1/orm/findMany/user", None, "")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));

    let (status, _) = send(app(), post("/v1/orm/findMany/user", Some("nope"), "")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authentication_runs_before_allow_lists() {
    let yaml = format!("{BASE}rest:\n  methods: \"count\"\n");
    let (status, _) = send(
        app_from(&yaml, "10.0.0.9:1".parse().unwrap()),
        post("/v1/orm/findMany/user", None, ""),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn denials_never_reach_the_operation() {
    let yaml = format!(
        "{BASE}rest:\n  methods: \"findMany\"\n  models: \"user\"\n  access:\n    user:\n      allowed_ips: \"127.0.0.1\"\n"
    );

    let (app, calls) = recording_app(&yaml, loopback(), |b| b);
    let (status, body) = send(app.clone(), post("/v1/orm/explode/user", Some(TOKEN), "")).await;
    assert_eq!((status, body), (StatusCode::BAD_REQUEST, json!({ "error": "Invalid method" })));

    let (status, body) = send(app, post("/v1/orm/findMany/post", Some(TOKEN), "")).await;
    assert_eq!((status, body), (StatusCode::BAD_REQUEST, json!({ "error": "Invalid model" })));

    let (remote, remote_calls) = recording_app(&yaml, "[::1]:2".parse().unwrap(), |b| b);
    let (status, body) = send(remote, post("/v1/orm/findMany/user", Some(TOKEN), "")).await;
    assert_eq!((status, body), (StatusCode::FORBIDDEN, json!({ "error": "Forbidden" })));

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(remote_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn foreign_ip_is_forbidden_by_default() {
    let (status, body) = send(
        app_from(BASE, "192.168.1.20:5555".parse().unwrap()),
        post("/v1/orm/findMany/user", Some(TOKEN), ""),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "Forbidden" }));
}

#[tokio::test]
async fn per_model_method_override_message() {
    let yaml = format!("{BASE}rest:\n  access:\n    user:\n      methods: [findMany]\n");
    let (status, body) = send(
        app_from(&yaml, loopback()),
        post("/v1/orm/deleteMany/user", Some(TOKEN), ""),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Method deleteMany is not allowed for model user" }));
}

#[tokio::test]
async fn global_filter_rejection_stops_dispatch() {
    let (app, calls) = recording_app(BASE, loopback(), |b| {
        b.global_filter(filter_fn(|_, _| Err(FilterError::new("bad payload"))))
    });
    let (status, body) = send(app, post("/v1/orm/findMany/user", Some(TOKEN), "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "bad payload" }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn model_filter_output_is_dispatched() {
    let (app, _) = recording_app(BASE, loopback(), |b| {
        b.global_filter(filter_fn(|_, _| Ok(json!({ "from": "global" }))))
            .model_filter(
                "user",
                filter_fn(|req, body| Ok(json!({ "from": "model", "saw": body, "by": req.identity.guard }))),
            )
    });
    let (status, body) = send(app, post("/v1/orm/findMany/user", Some(TOKEN), r#"{"raw":true}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "echo": { "from": "model", "saw": { "from": "global" }, "by": "admin" } })
    );
}

#[tokio::test]
async fn missing_client_is_500_and_not_ready() {
    let yaml = r#"
version: 1
auth:
  guards:
    admin:
      tokens: ["root-token"]
store:
  backend: none
"#;
    let app = app_from(yaml, loopback());
    let (status, body) = send(app.clone(), post("/v1/orm/findMany/user", Some(TOKEN), "")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "ORM client not found" }));

    let ready = app
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn disabled_endpoint_is_not_routed() {
    let yaml = format!("{BASE}rest:\n  enabled: false\n");
    let app = app_from(&yaml, loopback());
    let resp = app
        .clone()
        .oneshot(post("/v1/orm/findMany/user", Some(TOKEN), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let health = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_json_is_400() {
    let (status, body) = send(app(), post("/v1/orm/findMany/user", Some(TOKEN), "{oops")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
}

#[tokio::test]
async fn oversized_body_is_413_with_error_reply() {
    let yaml = format!("{BASE}gateway:\n  body_limit_bytes: 1024\n");
    let big = format!(r#"{{"where":{{"name":"{}"}}}}"#, "x".repeat(2048));

    let (status, body) = send(
        app_from(&yaml, loopback()),
        post("/v1/orm/findMany/user", Some(TOKEN), &big),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({ "error": "Payload too large" }));

    let (status, _) = send(
        app_from(&yaml, loopback()),
        post("/v1/orm/findMany/user", Some(TOKEN), r#"{"where":{}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn metrics_count_outcomes() {
    let app = app();
    send(app.clone(), post("/v1/orm/findMany/user", None, "")).await;
    send(app.clone(), post("/v1/orm/findMany/user", Some(TOKEN), "")).await;

    let resp = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let text = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(text.to_vec()).unwrap();
    assert!(text.contains("modelgate_requests_total{outcome=\"unauthorized\",status=\"401\"} 1"));
    assert!(text.contains("modelgate_requests_total{outcome=\"ok\",status=\"200\"} 1"));
}
