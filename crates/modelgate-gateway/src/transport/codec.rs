//! Request body decoding and reply encoding.
//!
//! - Empty (or whitespace-only) bodies decode to `{}`.
//! - Anything else must be valid JSON of any shape.
//! - A body that could not be read (over the size limit, broken stream) is
//!   reported through the same `{"error": ...}` shape as every other failure.
//! - A `Reply` becomes an HTTP response with `status` as the code and `data`
//!   as the JSON body.

use axum::{
    body::Bytes,
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};

use modelgate_core::error::{ModelGateError, Result};
use modelgate_core::protocol::reply::Reply;

pub fn read_body(body: std::result::Result<Bytes, BytesRejection>) -> Result<Value> {
    match body {
        Ok(bytes) => decode_body(&bytes),
        Err(rej) if rej.status() == StatusCode::PAYLOAD_TOO_LARGE => Err(ModelGateError::PayloadTooLarge),
        Err(rej) => Err(ModelGateError::BadRequest(rej.body_text())),
    }
}

pub fn decode_body(bytes: &[u8]) -> Result<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes)
        .map_err(|e| ModelGateError::BadRequest(format!("Invalid JSON body: {e}")))
}

pub fn encode_reply(reply: Reply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply.data)).into_response()
}
