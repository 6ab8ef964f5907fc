//! Reply envelope tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_json::json;

use modelgate_core::protocol::reply::Reply;
use modelgate_core::{ModelGateError, OperationError};

#[test]
fn success_wraps_result_as_data() {
    let r = Reply::from(Ok(json!([{ "id": 1 }])));
    assert_eq!(r.status, 200);
    assert_eq!(r.data, json!([{ "id": 1 }]));
    assert!(r.is_success());
}

#[test]
fn operation_failure_is_400_with_message() {
    let r = Reply::from(Err(OperationError::new("boom").into()));
    assert_eq!(r, Reply { status: 400, data: json!({ "error": "boom" }) });
}

#[test]
fn denials_keep_their_status() {
    let r = Reply::error(&ModelGateError::Forbidden);
    assert_eq!(r.status, 403);
    assert_eq!(r.data["error"], "Forbidden");

    let r = Reply::error(&ModelGateError::ClientUnavailable);
    assert_eq!(r.status, 500);
    assert_eq!(r.data["error"], "ORM client not found");
}

#[test]
fn serializes_as_status_and_data() {
    let r = Reply::error(&ModelGateError::ModelNotFound);
    let v = serde_json::to_value(&r).unwrap();
    assert_eq!(v, json!({ "status": 400, "data": { "error": "Model not found" } }));
}
