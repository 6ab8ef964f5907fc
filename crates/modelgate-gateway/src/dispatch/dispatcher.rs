use std::sync::Arc;

use serde_json::Value;

use modelgate_core::error::{ModelGateError, Result};
use modelgate_core::protocol::context::RequestContext;

use super::filter::run_chain;
use super::registry::ModelRegistry;
use crate::policy::Policy;

/// Resolves `(model, method)` against the registry and invokes it.
///
/// `client` is `None` when the host was started without a model backend.
pub struct Dispatcher {
    client: Option<Arc<ModelRegistry>>,
}

impl Dispatcher {
    pub fn new(client: Option<Arc<ModelRegistry>>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> Option<&ModelRegistry> {
        self.client.as_deref()
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Lookup, filter chain, shape check, then the operation itself.
    /// Filters never run for unknown models/methods.
    pub async fn dispatch(&self, policy: &Policy, req: &RequestContext, body: Value) -> Result<Value> {
        let client = self.client.as_ref().ok_or(ModelGateError::ClientUnavailable)?;
        let op = client.resolve(&req.model, &req.method)?;

        let body = run_chain(policy.filters_for(&req.model), req, body).await?;
        op.input.check(&body)?;

        Ok(op.handler.call(body).await?)
    }
}
