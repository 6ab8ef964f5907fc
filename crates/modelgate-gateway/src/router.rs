//! Axum router wiring.
//!
//! The model endpoint is only mounted when `rest.enabled` is true; the ops
//! endpoints are always present.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport};

pub const MODEL_ROUTE: &str = "/v1/orm/:method/:model";

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics));

    if state.cfg().rest.enabled {
        router = router.route(MODEL_ROUTE, post(transport::http::invoke));
    } else {
        tracing::info!("model endpoint disabled (rest.enabled = false)");
    }

    let limit = state.cfg().gateway.body_limit_bytes;
    router
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}
