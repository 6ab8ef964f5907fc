//! Per-request context (transient, one per call).

use serde::Serialize;

/// Caller identity resolved by the authentication guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Guard that accepted the token.
    pub guard: String,
    /// Stable subject name for logs.
    pub subject: String,
}

/// Everything about an incoming call except its body.
///
/// Built after authentication; the raw token never travels past the guard.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    /// Target model name (path segment).
    pub model: String,
    /// Target operation name (path segment).
    pub method: String,
    /// Peer address as text, compared literally against IP allow-lists.
    pub source_ip: String,
    /// Resolved caller.
    pub identity: Identity,
}

impl RequestContext {
    pub fn new(
        model: impl Into<String>,
        method: impl Into<String>,
        source_ip: impl Into<String>,
        identity: Identity,
    ) -> Self {
        Self {
            model: model.into(),
            method: method.into(),
            source_ip: source_ip.into(),
            identity,
        }
    }
}
