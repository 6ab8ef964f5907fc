//! Closed capability registry: `(model, method) -> operation`.
//!
//! Built once at startup by the model backend, then frozen behind an `Arc`.
//! Unknown pairs are rejected by lookup instead of reflective resolution.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use modelgate_core::error::{ModelGateError, OperationError, Result};

/// One callable operation on a model (e.g. `user.findMany`).
#[async_trait]
pub trait ModelOperation: Send + Sync {
    async fn call(&self, body: Value) -> std::result::Result<Value, OperationError>;
}

/// Accepted body shape for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    Any,
    Object,
}

impl InputShape {
    pub fn check(self, body: &Value) -> Result<()> {
        match self {
            InputShape::Any => Ok(()),
            InputShape::Object if body.is_object() => Ok(()),
            InputShape::Object => Err(ModelGateError::BadRequest(
                "Invalid body: expected a JSON object".into(),
            )),
        }
    }
}

#[derive(Clone)]
pub struct OperationDescriptor {
    pub input: InputShape,
    pub handler: Arc<dyn ModelOperation>,
}

#[derive(Default)]
pub struct ModelRegistry {
    models: HashMap<String, HashMap<String, OperationDescriptor>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        model: &str,
        method: &str,
        input: InputShape,
        handler: Arc<dyn ModelOperation>,
    ) {
        self.models
            .entry(model.to_string())
            .or_default()
            .insert(method.to_string(), OperationDescriptor { input, handler });
    }

    pub fn has_model(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    /// Two-step lookup so callers can tell a missing model from a missing method.
    pub fn resolve(&self, model: &str, method: &str) -> Result<&OperationDescriptor> {
        self.models
            .get(model)
            .ok_or(ModelGateError::ModelNotFound)?
            .get(method)
            .ok_or(ModelGateError::MethodNotFound)
    }

    pub fn model_names(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.models.keys().map(String::as_str).collect();
        v.sort_unstable();
        v
    }

    pub fn methods_of(&self, model: &str) -> Vec<&str> {
        let mut v: Vec<&str> = self
            .models
            .get(model)
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default();
        v.sort_unstable();
        v
    }
}
