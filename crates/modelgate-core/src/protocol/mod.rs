//! Protocol types shared by the transport and model backends.
//!
//! - `context`: the per-request view handed to filters and the policy pipeline.
//! - `reply`: the uniform `{status, data}` envelope every request resolves to.

pub mod context;
pub mod reply;
