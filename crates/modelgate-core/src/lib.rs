//! modelgate core: transport-agnostic request context, reply envelope, and errors.
//!
//! This crate defines the contracts shared by the gateway, model backends, and
//! body filters. It intentionally carries no HTTP or runtime dependencies so
//! backends can implement operations without pulling in the transport stack.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `ModelGateError`/`Result` so a malformed
//! request can never take the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Error types and the shared `Result` alias, re-exported at the crate root.
pub use error::{FilterError, ModelGateError, OperationError, Result};
