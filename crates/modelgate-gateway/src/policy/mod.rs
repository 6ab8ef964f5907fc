//! Policy layer (allow-lists, per-model overrides, filters).
//!
//! Compiles the `rest` config section into an immutable `Policy` that the
//! transport consults on every request before anything is dispatched.

pub mod allowlist;
pub mod engine;

pub use allowlist::AllowList;
pub use engine::{ModelOverride, Policy, PolicyBuilder, PolicyDecision};
