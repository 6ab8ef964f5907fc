//! Response envelope.
//!
//! Success carries the operation result as `data`; failure carries
//! `{"error": message}` with the error's status.

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ModelGateError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub status: u16,
    pub data: Value,
}

impl Reply {
    pub fn ok(data: Value) -> Self {
        Self { status: 200, data }
    }

    pub fn error(err: &ModelGateError) -> Self {
        Self {
            status: err.status(),
            data: json!({ "error": err.to_string() }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

impl From<crate::Result<Value>> for Reply {
    fn from(res: crate::Result<Value>) -> Self {
        match res {
            Ok(v) => Reply::ok(v),
            Err(e) => Reply::error(&e),
        }
    }
}
