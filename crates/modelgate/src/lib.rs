//! Top-level facade crate for modelgate.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use modelgate_core::*;
}

pub mod gateway {
    pub use modelgate_gateway::*;
}
