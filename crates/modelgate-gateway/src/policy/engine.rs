use std::collections::HashMap;
use std::sync::Arc;

use modelgate_core::error::ModelGateError;
use modelgate_core::protocol::context::RequestContext;

use crate::config::schema::{ModelAccess, RestSection};
use crate::dispatch::filter::BodyFilter;

use super::allowlist::AllowList;

/// Decision from policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Pass,
    Deny(ModelGateError),
}

impl PolicyDecision {
    pub fn is_pass(&self) -> bool {
        matches!(self, PolicyDecision::Pass)
    }
}

/// Narrowing rules for one model. `None` sets leave the global gate alone.
#[derive(Clone, Default)]
pub struct ModelOverride {
    pub methods: Option<AllowList>,
    pub allowed_ips: Option<AllowList>,
    pub filter: Option<Arc<dyn BodyFilter>>,
}

impl ModelOverride {
    fn from_access(access: &ModelAccess) -> Self {
        Self {
            methods: access.methods.as_ref().map(|l| AllowList::compile(Some(l))),
            allowed_ips: access.allowed_ips.as_ref().map(|l| AllowList::compile(Some(l))),
            filter: None,
        }
    }
}

impl std::fmt::Debug for ModelOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelOverride")
            .field("methods", &self.methods)
            .field("allowed_ips", &self.allowed_ips)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

/// Immutable access policy.
/// Construct once at startup, then share via Arc.
pub struct Policy {
    methods: AllowList,
    models: AllowList,
    ips: AllowList,
    guard: String,
    overrides: HashMap<String, ModelOverride>,
    global_filter: Option<Arc<dyn BodyFilter>>,
}

impl Policy {
    pub fn builder(rest: &RestSection) -> PolicyBuilder {
        PolicyBuilder::from_config(rest)
    }

    pub fn guard(&self) -> &str {
        &self.guard
    }
    pub fn methods(&self) -> &AllowList {
        &self.methods
    }
    pub fn models(&self) -> &AllowList {
        &self.models
    }
    pub fn ips(&self) -> &AllowList {
        &self.ips
    }
    pub fn model_override(&self, model: &str) -> Option<&ModelOverride> {
        self.overrides.get(model)
    }

    /// Global allow-lists first, then the model's own narrowing.
    pub fn authorize(&self, req: &RequestContext) -> PolicyDecision {
        if !self.methods.contains(&req.method) {
            return PolicyDecision::Deny(ModelGateError::InvalidMethod);
        }
        if !self.models.contains(&req.model) {
            return PolicyDecision::Deny(ModelGateError::InvalidModel);
        }
        if !self.ips.contains(&req.source_ip) {
            return PolicyDecision::Deny(ModelGateError::Forbidden);
        }

        let Some(ov) = self.overrides.get(&req.model) else {
            return PolicyDecision::Pass;
        };

        if let Some(methods) = &ov.methods {
            if !methods.contains(&req.method) {
                return PolicyDecision::Deny(ModelGateError::MethodNotAllowedForModel {
                    method: req.method.clone(),
                    model: req.model.clone(),
                });
            }
        }
        if let Some(ips) = &ov.allowed_ips {
            if !ips.contains(&req.source_ip) {
                return PolicyDecision::Deny(ModelGateError::Forbidden);
            }
        }

        PolicyDecision::Pass
    }

    /// Filters for `model` in execution order (global, then model).
    pub fn filters_for<'a>(&'a self, model: &str) -> impl Iterator<Item = &'a Arc<dyn BodyFilter>> {
        let model_filter = self.overrides.get(model).and_then(|o| o.filter.as_ref());
        self.global_filter.iter().chain(model_filter)
    }
}

/// Collects config-derived rules plus code-supplied filters, then freezes.
pub struct PolicyBuilder {
    methods: AllowList,
    models: AllowList,
    ips: AllowList,
    guard: String,
    overrides: HashMap<String, ModelOverride>,
    global_filter: Option<Arc<dyn BodyFilter>>,
}

impl PolicyBuilder {
    pub fn from_config(rest: &RestSection) -> Self {
        let overrides = rest
            .access
            .iter()
            .map(|(model, access)| (model.trim().to_string(), ModelOverride::from_access(access)))
            .collect();

        Self {
            methods: AllowList::compile(Some(&rest.methods)),
            models: AllowList::compile(Some(&rest.models)),
            ips: AllowList::compile(Some(&rest.allowed_ips)),
            guard: rest.guard.trim().to_string(),
            overrides,
            global_filter: None,
        }
    }

    pub fn global_filter(mut self, f: Arc<dyn BodyFilter>) -> Self {
        self.global_filter = Some(f);
        self
    }

    /// Attach a filter to `model`, creating an otherwise empty override if needed.
    pub fn model_filter(mut self, model: &str, f: Arc<dyn BodyFilter>) -> Self {
        self.overrides.entry(model.to_string()).or_default().filter = Some(f);
        self
    }

    pub fn build(self) -> Policy {
        Policy {
            methods: self.methods,
            models: self.models,
            ips: self.ips,
            guard: self.guard,
            overrides: self.overrides,
            global_filter: self.global_filter,
        }
    }
}
