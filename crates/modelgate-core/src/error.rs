//! Shared error type across modelgate crates.
//!
//! `Display` of every client-visible variant is the exact message written into
//! the `{"error": ...}` reply body.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input, unknown model/method, rejected body.
    BadRequest,
    /// Missing or unacceptable credentials.
    Unauthorized,
    /// Caller address not allowed.
    Forbidden,
    /// Request body over the configured limit.
    PayloadTooLarge,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Host misconfiguration or internal fault.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Unauthorized => "UNAUTHORIZED",
            ClientCode::Forbidden => "FORBIDDEN",
            ClientCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ModelGateError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelGateError {
    // policy denials
    #[error("Invalid method")]
    InvalidMethod,
    #[error("Invalid model")]
    InvalidModel,
    #[error("Forbidden")]
    Forbidden,
    #[error("Method {method} is not allowed for model {model}")]
    MethodNotAllowedForModel { method: String, model: String },

    #[error("Unauthorized")]
    Unauthorized,

    // dispatch
    #[error("ORM client not found")]
    ClientUnavailable,
    #[error("Model not found")]
    ModelNotFound,
    #[error("Model does not have this method")]
    MethodNotFound,
    #[error("{0}")]
    Filter(String),
    #[error("{0}")]
    Operation(String),

    #[error("{0}")]
    BadRequest(String),
    #[error("Payload too large")]
    PayloadTooLarge,
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl ModelGateError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            ModelGateError::InvalidMethod
            | ModelGateError::InvalidModel
            | ModelGateError::MethodNotAllowedForModel { .. }
            | ModelGateError::ModelNotFound
            | ModelGateError::MethodNotFound
            | ModelGateError::Filter(_)
            | ModelGateError::Operation(_)
            | ModelGateError::BadRequest(_) => ClientCode::BadRequest,
            ModelGateError::Forbidden => ClientCode::Forbidden,
            ModelGateError::PayloadTooLarge => ClientCode::PayloadTooLarge,
            ModelGateError::Unauthorized => ClientCode::Unauthorized,
            ModelGateError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            ModelGateError::ClientUnavailable | ModelGateError::Internal(_) => ClientCode::Internal,
        }
    }

    /// HTTP status code reported to the caller.
    pub fn status(&self) -> u16 {
        match self.client_code() {
            ClientCode::BadRequest | ClientCode::UnsupportedVersion => 400,
            ClientCode::Unauthorized => 401,
            ClientCode::Forbidden => 403,
            ClientCode::PayloadTooLarge => 413,
            ClientCode::Internal => 500,
        }
    }

    /// True for denials produced by the allow-list pipeline.
    pub fn is_policy_denial(&self) -> bool {
        matches!(
            self,
            ModelGateError::InvalidMethod
                | ModelGateError::InvalidModel
                | ModelGateError::Forbidden
                | ModelGateError::MethodNotAllowedForModel { .. }
        )
    }
}

/// Rejection raised by a body filter. The message reaches the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FilterError(pub String);

impl FilterError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<FilterError> for ModelGateError {
    fn from(e: FilterError) -> Self {
        ModelGateError::Filter(e.0)
    }
}

/// Failure raised by a model operation (the backend "throwing").
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct OperationError(pub String);

impl OperationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<OperationError> for ModelGateError {
    fn from(e: OperationError) -> Self {
        ModelGateError::Operation(e.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denial_statuses() {
        assert_eq!(ModelGateError::InvalidMethod.status(), 400);
        assert_eq!(ModelGateError::InvalidModel.status(), 400);
        assert_eq!(ModelGateError::Forbidden.status(), 403);
        assert_eq!(ModelGateError::Unauthorized.status(), 401);
        assert_eq!(ModelGateError::ClientUnavailable.status(), 500);
        assert_eq!(ModelGateError::ModelNotFound.status(), 400);
        assert_eq!(ModelGateError::PayloadTooLarge.status(), 413);
    }

    #[test]
    fn override_message_names_method_and_model() {
        let e = ModelGateError::MethodNotAllowedForModel {
            method: "delete".into(),
            model: "user".into(),
        };
        assert_eq!(e.to_string(), "Method delete is not allowed for model user");
        assert!(e.is_policy_denial());
    }

    #[test]
    fn filter_and_operation_messages_pass_through() {
        let e: ModelGateError = FilterError::new("bad payload").into();
        assert_eq!(e.to_string(), "bad payload");
        assert_eq!(e.status(), 400);

        let e: ModelGateError = OperationError::new("boom").into();
        assert_eq!(e.to_string(), "boom");
        assert!(!e.is_policy_denial());
    }
}
