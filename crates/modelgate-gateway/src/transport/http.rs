//! Generic model endpoint: `POST /v1/orm/:method/:model`.
//!
//! Per request, in order:
//! - authenticate the bearer token with the policy's guard (401 on failure)
//! - run the allow-list pipeline (400/403 on deny)
//! - read and decode the body (`{}` when empty, 413 over the size limit)
//! - dispatch through filters to the model operation
//!
//! Every outcome, success or not, is written back as a `Reply`.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, ConnectInfo, Path, State},
    http::{header, HeaderMap},
    response::Response,
};
use tracing::Instrument;

use modelgate_core::error::{ModelGateError, Result};
use modelgate_core::protocol::context::{Identity, RequestContext};
use modelgate_core::protocol::reply::Reply;

use crate::app_state::AppState;
use crate::auth::bearer_token;
use crate::policy::PolicyDecision;
use crate::transport::codec::{encode_reply, read_body};

/// Peer address as compared against IP allow-lists.
/// IPv4-mapped IPv6 peers (`::ffff:a.b.c.d`) are reported as plain IPv4.
pub fn source_ip(peer: &SocketAddr) -> String {
    peer.ip().to_canonical().to_string()
}

pub async fn invoke(
    State(app): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path((method, model)): Path<(String, String)>,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let ip = source_ip(&peer);
    let span = tracing::info_span!("orm_request", %model, %method, %ip);

    let reply = handle(app, model, method, ip, headers, body)
        .instrument(span)
        .await;
    encode_reply(reply)
}

async fn handle(
    app: AppState,
    model: String,
    method: String,
    ip: String,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Reply {
    let metrics = app.metrics();
    let policy = app.policy();

    // ---- authentication precedes every allow-list check
    let auth = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    let identity = match authenticate(&app, auth).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(guard = %policy.guard(), "authentication failed");
            metrics.record_request("unauthorized", e.status());
            return Reply::error(&e);
        }
    };

    let req = RequestContext::new(model, method, ip, identity);

    // ---- allow-list pipeline
    if let PolicyDecision::Deny(e) = policy.authorize(&req) {
        tracing::warn!(subject = %req.identity.subject, reason = %e, "request denied by policy");
        metrics.record_request("denied", e.status());
        return Reply::error(&e);
    }

    let body = match read_body(body) {
        Ok(v) => v,
        Err(e) => {
            metrics.record_request("failed", e.status());
            return Reply::error(&e);
        }
    };

    // ---- dispatch
    let started = Instant::now();
    let res = app.dispatcher().dispatch(&policy, &req, body).await;
    let elapsed = started.elapsed();

    match &res {
        Ok(_) => {
            tracing::info!(subject = %req.identity.subject, elapsed_us = elapsed.as_micros() as u64, "dispatched");
            metrics.dispatch_duration.observe(&[("outcome", "ok")], elapsed);
            metrics.record_request("ok", 200);
        }
        Err(e) => {
            if matches!(e, ModelGateError::ClientUnavailable) {
                tracing::error!("model client missing");
            } else {
                tracing::debug!(error = %e, "dispatch failed");
            }
            metrics.dispatch_duration.observe(&[("outcome", "failed")], elapsed);
            metrics.record_request("failed", e.status());
        }
    }

    Reply::from(res)
}

async fn authenticate(
    app: &AppState,
    auth_header: Option<&str>,
) -> Result<Identity> {
    let token = bearer_token(auth_header)?;
    let policy = app.policy();
    app.guard().authenticate(policy.guard(), token).await
}
