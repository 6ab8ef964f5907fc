//! HTTP transport: body decoding and the generic model endpoint.

pub mod codec;
pub mod http;
