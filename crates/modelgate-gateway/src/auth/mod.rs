//! Authentication guards.
//!
//! A guard is looked up by name (the policy's `guard`) and turns a bearer
//! token into an `Identity`. It runs before any allow-list check; a request
//! that fails here never reaches the policy pipeline.

use std::collections::HashMap;

use async_trait::async_trait;

use modelgate_core::error::{ModelGateError, Result};
use modelgate_core::protocol::context::Identity;

use crate::config::schema::AuthSection;

#[async_trait]
pub trait Guard: Send + Sync {
    async fn authenticate(&self, guard_name: &str, token: &str) -> Result<Identity>;
}

/// Tokens listed under `auth.guards.<name>.tokens`.
#[derive(Debug, Default)]
pub struct StaticTokenGuard {
    guards: HashMap<String, Vec<String>>,
}

impl StaticTokenGuard {
    pub fn from_config(auth: &AuthSection) -> Self {
        let guards = auth
            .guards
            .iter()
            .map(|(name, g)| {
                let tokens = g
                    .tokens
                    .iter()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect();
                (name.clone(), tokens)
            })
            .collect();
        Self { guards }
    }

    pub fn with_token(mut self, guard_name: &str, token: &str) -> Self {
        self.guards
            .entry(guard_name.to_string())
            .or_default()
            .push(token.to_string());
        self
    }

    pub fn knows_guard(&self, guard_name: &str) -> bool {
        self.guards.contains_key(guard_name)
    }
}

#[async_trait]
impl Guard for StaticTokenGuard {
    async fn authenticate(&self, guard_name: &str, token: &str) -> Result<Identity> {
        let Some(tokens) = self.guards.get(guard_name) else {
            tracing::warn!(guard = %guard_name, "no such guard configured");
            return Err(ModelGateError::Unauthorized);
        };

        let idx = tokens
            .iter()
            .position(|t| t == token)
            .ok_or(ModelGateError::Unauthorized)?;

        Ok(Identity {
            guard: guard_name.to_string(),
            subject: format!("{guard_name}:{idx}"),
        })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str> {
    let value = header.ok_or(ModelGateError::Unauthorized)?;
    let (scheme, token) = value.trim().split_once(' ').ok_or(ModelGateError::Unauthorized)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ModelGateError::Unauthorized);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(ModelGateError::Unauthorized);
    }
    Ok(token)
}
