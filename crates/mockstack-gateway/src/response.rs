//! Response serialization and error translation.
//!
//! Both protocol families share the error body shape:
//!
//! ```json
//! {
//!   "__type": "ClientException",
//!   "message": "compute environment ce1 does not exist"
//! }
//! ```
//!
//! They differ in content type, in the headers that accompany the body, and in
//! how a service picks the HTTP status (see [`ErrorConvention`]).

use serde::Serialize;

use crate::body::GatewayBody;
use crate::descriptor::{ErrorConvention, ProtocolKind};
use crate::error::ServiceError;

/// Content type of responses not tied to a protocol family.
pub const NEUTRAL_CONTENT_TYPE: &str = "application/json";

/// Header carrying the request id on every response.
pub const REQUEST_ID_HEADER: &str = "x-amzn-requestid";

/// Header carrying the exception name on REST error responses.
pub const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

/// Serialize an error into the wire envelope.
#[must_use]
pub fn error_to_json(error: &ServiceError) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "__type": error.code,
        "message": error.message,
    }))
    .expect("JSON serialization of error cannot fail")
}

/// HTTP status for an error under a service's convention.
#[must_use]
pub fn error_status(error: &ServiceError, convention: ErrorConvention) -> http::StatusCode {
    error
        .status
        .unwrap_or_else(|| convention.status_for(error.kind))
}

/// Convert a [`ServiceError`] into a complete HTTP error response.
#[must_use]
pub fn error_to_response(
    error: &ServiceError,
    protocol: ProtocolKind,
    convention: ErrorConvention,
    request_id: &str,
) -> http::Response<GatewayBody> {
    let json = error_to_json(error);
    let mut builder = http::Response::builder()
        .status(error_status(error, convention))
        .header(http::header::CONTENT_TYPE, protocol.content_type())
        .header(REQUEST_ID_HEADER, request_id);

    if protocol == ProtocolKind::RestJson {
        builder = builder.header(ERROR_TYPE_HEADER, error.code.as_str());
    }

    builder
        .body(GatewayBody::from(json))
        .expect("valid error response")
}

/// Build a success response from JSON bytes.
///
/// JSON-RPC responses carry the `x-amz-crc32` checksum SDKs validate.
#[must_use]
pub fn json_response(protocol: ProtocolKind, json: Vec<u8>) -> http::Response<GatewayBody> {
    let crc = crc32fast::hash(&json);
    let mut response = http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, protocol.content_type())
        .body(GatewayBody::from(json))
        .expect("valid JSON response");

    if protocol == ProtocolKind::JsonRpc {
        if let Ok(hv) = http::HeaderValue::from_str(&crc.to_string()) {
            response.headers_mut().insert("x-amz-crc32", hv);
        }
    }

    response
}

/// Serialize a value and wrap it in a success response.
///
/// # Errors
/// Returns an internal [`ServiceError`] if the value cannot be serialized.
pub fn serialize_response<T: Serialize>(
    protocol: ProtocolKind,
    value: &T,
) -> Result<http::Response<GatewayBody>, ServiceError> {
    let json = serde_json::to_vec(value)
        .map_err(|e| ServiceError::internal(format!("Failed to serialize response: {e}")))?;
    Ok(json_response(protocol, json))
}

/// A `{}` success response.
#[must_use]
pub fn empty_json_response(protocol: ProtocolKind) -> http::Response<GatewayBody> {
    json_response(protocol, b"{}".to_vec())
}

/// Protocol-neutral 404 for requests no service claims.
#[must_use]
pub fn not_found_response(request_id: &str) -> http::Response<GatewayBody> {
    let json = serde_json::to_vec(&serde_json::json!({
        "__type": "NotFound",
        "message": "No registered service handles this request",
    }))
    .expect("JSON serialization of error cannot fail");

    http::Response::builder()
        .status(http::StatusCode::NOT_FOUND)
        .header(http::header::CONTENT_TYPE, NEUTRAL_CONTENT_TYPE)
        .header(REQUEST_ID_HEADER, request_id)
        .body(GatewayBody::from(json))
        .expect("valid not-found response")
}

/// Health check body listing every registered service as running.
#[must_use]
pub fn health_response<'a>(names: impl IntoIterator<Item = &'a str>) -> http::Response<GatewayBody> {
    let services: serde_json::Map<String, serde_json::Value> = names
        .into_iter()
        .map(|name| (name.to_owned(), serde_json::Value::from("running")))
        .collect();
    let json = serde_json::to_vec(&serde_json::json!({ "services": services }))
        .expect("JSON serialization of health status cannot fail");

    http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, NEUTRAL_CONTENT_TYPE)
        .body(GatewayBody::from(json))
        .expect("valid health response")
}
