//! Body filters: fallible transforms applied to the request body before dispatch.
//!
//! Order is fixed: the global filter first, then the model filter. Each step
//! may replace the body; the first error aborts the request.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use modelgate_core::error::{FilterError, Result};
use modelgate_core::protocol::context::RequestContext;

#[async_trait]
pub trait BodyFilter: Send + Sync {
    async fn apply(&self, req: &RequestContext, body: Value) -> std::result::Result<Value, FilterError>;
}

/// Adapter for synchronous closures.
pub struct FnFilter<F>(F);

#[async_trait]
impl<F> BodyFilter for FnFilter<F>
where
    F: Fn(&RequestContext, Value) -> std::result::Result<Value, FilterError> + Send + Sync,
{
    async fn apply(&self, req: &RequestContext, body: Value) -> std::result::Result<Value, FilterError> {
        (self.0)(req, body)
    }
}

/// Wrap a closure as a shareable filter.
pub fn filter_fn<F>(f: F) -> Arc<dyn BodyFilter>
where
    F: Fn(&RequestContext, Value) -> std::result::Result<Value, FilterError> + Send + Sync + 'static,
{
    Arc::new(FnFilter(f))
}

/// Run `filters` in order, threading the body through.
pub async fn run_chain<'a, I>(filters: I, req: &RequestContext, mut body: Value) -> Result<Value>
where
    I: IntoIterator<Item = &'a Arc<dyn BodyFilter>>,
{
    for f in filters {
        body = f.apply(req, body).await?;
    }
    Ok(body)
}
