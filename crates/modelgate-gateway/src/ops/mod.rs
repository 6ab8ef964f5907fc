//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/readyz`  : readiness (503 when draining or no model client)
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.metrics().is_draining() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else if !state.dispatcher().has_client() {
        (StatusCode::SERVICE_UNAVAILABLE, "no model client")
    } else {
        (StatusCode::OK, "ready")
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics().render(),
    )
        .into_response()
}
