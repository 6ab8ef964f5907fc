//! Dispatcher module exports.
//!
//! Re-exports the registry, dispatcher and filter traits so model backends
//! and host applications can depend on this module directly.

pub mod dispatcher;
pub mod filter;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use filter::{filter_fn, BodyFilter};
pub use registry::{InputShape, ModelOperation, ModelRegistry, OperationDescriptor};
