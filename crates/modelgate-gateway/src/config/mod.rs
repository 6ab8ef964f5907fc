//! Gateway config loader (strict parsing) plus environment overrides.

pub mod normalize;
pub mod schema;

use std::fs;

use modelgate_core::error::{ModelGateError, Result};

pub use normalize::{normalize_list, ListInput, WILDCARD};
pub use schema::{
    AuthSection, GatewayConfig, GuardConfig, ModelAccess, RestSection, StoreBackend, StoreSection,
};

pub const ENV_METHODS: &str = "MODELGATE_METHODS";
pub const ENV_MODELS: &str = "MODELGATE_MODELS";
pub const ENV_ALLOWED_IPS: &str = "MODELGATE_ALLOWED_IPS";
pub const ENV_ENABLED: &str = "MODELGATE_ENABLED";
pub const ENV_GUARD: &str = "MODELGATE_GUARD";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ModelGateError::Internal(format!("read config failed: {e}")))?;
    let mut cfg = load_from_str(&s)?;
    apply_env_overrides(&mut cfg, |k| std::env::var(k).ok());
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| ModelGateError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Overlay `MODELGATE_*` values onto the `rest` section.
///
/// `lookup` is usually `std::env::var`; tests pass a map instead.
pub fn apply_env_overrides<F>(cfg: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let rest = &mut cfg.rest;

    if let Some(v) = lookup(ENV_METHODS) {
        rest.methods = ListInput::One(v);
    }
    if let Some(v) = lookup(ENV_MODELS) {
        rest.models = ListInput::One(v);
    }
    if let Some(v) = lookup(ENV_ALLOWED_IPS) {
        rest.allowed_ips = ListInput::One(v);
    }
    if let Some(v) = lookup(ENV_ENABLED) {
        match parse_bool(&v) {
            Some(b) => rest.enabled = b,
            None => tracing::warn!(var = ENV_ENABLED, value = %v, "ignoring unparsable boolean"),
        }
    }
    if let Some(v) = lookup(ENV_GUARD) {
        let v = v.trim();
        if !v.is_empty() {
            rest.guard = v.to_string();
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
