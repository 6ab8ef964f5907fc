use std::collections::BTreeMap;

use serde::Deserialize;
use modelgate_core::error::{ModelGateError, Result};

use super::normalize::ListInput;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub rest: RestSection,

    #[serde(default)]
    pub auth: AuthSection,

    #[serde(default)]
    pub store: StoreSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ModelGateError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.rest.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(1024..=64 * 1024 * 1024).contains(&self.body_limit_bytes) {
            return Err(ModelGateError::BadRequest(
                "gateway.body_limit_bytes must be between 1024 and 67108864".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_body_limit_bytes() -> usize {
    1024 * 1024
}

/// The generic model endpoint.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestSection {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_guard")]
    pub guard: String,

    #[serde(default = "default_wildcard")]
    pub methods: ListInput,

    #[serde(default = "default_wildcard")]
    pub models: ListInput,

    #[serde(default = "default_allowed_ips")]
    pub allowed_ips: ListInput,

    /// Per-model narrowing, keyed by model name.
    #[serde(default)]
    pub access: BTreeMap<String, ModelAccess>,
}

impl Default for RestSection {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            guard: default_guard(),
            methods: default_wildcard(),
            models: default_wildcard(),
            allowed_ips: default_allowed_ips(),
            access: BTreeMap::new(),
        }
    }
}

impl RestSection {
    pub fn validate(&self) -> Result<()> {
        if self.guard.trim().is_empty() {
            return Err(ModelGateError::BadRequest("rest.guard must not be empty".into()));
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}
fn default_guard() -> String {
    "admin".into()
}
fn default_wildcard() -> ListInput {
    ListInput::One("*".into())
}
fn default_allowed_ips() -> ListInput {
    ListInput::One("127.0.0.1,::1".into())
}

/// Optional narrowing sets for one model. Absent means "no extra restriction".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelAccess {
    #[serde(default)]
    pub methods: Option<ListInput>,
    #[serde(default)]
    pub allowed_ips: Option<ListInput>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    /// Static bearer tokens per guard name.
    #[serde(default)]
    pub guards: BTreeMap<String, GuardConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuardConfig {
    #[serde(default)]
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Memory,
    /// No model client; every dispatch reports the client as missing.
    None,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Models served by the in-memory backend.
    #[serde(default)]
    pub models: ListInput,
}
