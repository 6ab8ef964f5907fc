//! Shared application state for the modelgate gateway.
//!
//! Everything here is built once at startup and only read afterwards: the
//! policy, the dispatcher (with its frozen registry) and the guard are shared
//! through `Arc`s by every request handler.

use std::sync::Arc;

use modelgate_core::error::Result;

use crate::auth::{Guard, StaticTokenGuard};
use crate::config::GatewayConfig;
use crate::dispatch::{Dispatcher, ModelRegistry};
use crate::obs::metrics::GatewayMetrics;
use crate::policy::Policy;
use crate::store;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    dispatcher: Arc<Dispatcher>,
    metrics: Arc<GatewayMetrics>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    policy: Arc<Policy>,
    guard: Arc<dyn Guard>,
}

impl AppState {
    /// Build state from config alone: no filters, the configured store backend
    /// and static bearer tokens.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        cfg.validate()?;

        let policy = Policy::builder(&cfg.rest).build();
        let client = store::build_client(&cfg.store);

        let guard = StaticTokenGuard::from_config(&cfg.auth);
        if cfg.rest.enabled && !guard.knows_guard(policy.guard()) {
            tracing::warn!(guard = %policy.guard(), "rest.guard has no tokens configured; every request will be rejected");
        }

        Ok(Self::from_parts(cfg, policy, client, Arc::new(guard)))
    }

    /// Assemble state from host-supplied parts (custom filters, registry or guard).
    pub fn from_parts(
        cfg: GatewayConfig,
        policy: Policy,
        client: Option<Arc<ModelRegistry>>,
        guard: Arc<dyn Guard>,
    ) -> Self {
        match client.as_deref() {
            Some(registry) => {
                if !policy.models().allows_all() {
                    for model in policy.models().items() {
                        if !registry.has_model(model) {
                            tracing::warn!(model = %model, "allowed model is not served by the model client");
                        }
                    }
                }
                tracing::info!(models = ?registry.model_names(), "model client ready");
            }
            None => tracing::warn!("no model client configured; dispatch will fail with 500"),
        }

        tracing::info!(
            enabled = cfg.rest.enabled,
            guard = %policy.guard(),
            methods = ?policy.methods().items(),
            models = ?policy.models().items(),
            allowed_ips = ?policy.ips().items(),
            "policy compiled"
        );

        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                policy: Arc::new(policy),
                guard,
            }),
            dispatcher: Arc::new(Dispatcher::new(client)),
            metrics: Arc::new(GatewayMetrics::default()),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn policy(&self) -> Arc<Policy> {
        Arc::clone(&self.inner.policy)
    }

    pub fn guard(&self) -> Arc<dyn Guard> {
        Arc::clone(&self.inner.guard)
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }
}
