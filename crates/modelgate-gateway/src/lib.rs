//! modelgate gateway library entry.
//!
//! This crate wires config, policy, authentication, the dispatcher and the
//! model backends into a single HTTP endpoint. It is consumed by the binary
//! (`main.rs`), by integration tests, and by hosts that want to attach their
//! own filters or model registry through `AppState::from_parts`.

pub mod app_state;
pub mod auth;
pub mod config;
pub mod dispatch;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod router;
pub mod store;
pub mod transport;
