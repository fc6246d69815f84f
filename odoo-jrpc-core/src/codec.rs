//! Codec for the Odoo JSON-RPC dialect
//!
//! Outgoing envelopes are plain serde encodes. Incoming responses go through
//! three steps before the caller sees them:
//!
//! 1. [`decode_body`] - raw bytes to a JSON value
//! 2. [`normalize_response`] - patch the server's missing-`result` quirk
//! 3. [`classify`] + [`into_result`] - JSON-RPC grammar check and mapping to
//!    a value or a typed [`Error`]
//!
//! # The missing `result` quirk
//!
//! When a remote method returns nothing, Odoo answers with neither `result`
//! nor `error`. A strict JSON-RPC parser would reject that as malformed, so
//! normalization injects [`OK_SENTINEL`] as the result before classifying.
//!
//! The "is a result present" test is a truthiness test, not a key test: a
//! legitimate `0`, `false`, `""` or `null` result is also replaced by the
//! sentinel. Callers that need to tell those apart cannot do so through this
//! codec.
//!
//! # Examples
//!
//! ```rust
//! use odoo_jrpc_core::codec;
//! use serde_json::json;
//!
//! let raw = json!({"jsonrpc": "2.0", "id": 4});
//! let patched = codec::normalize_response(raw);
//! let value = codec::into_result(codec::classify(&patched)).unwrap();
//! assert_eq!(value, json!(codec::OK_SENTINEL));
//! ```

use crate::error::{Error, RemoteErrorData, Result};
use crate::types::{Id, JsonRpcMessage, JsonRpcRequest, JSONRPC_VERSION};
use serde::Serialize;
use serde_json::Value;

/// Result injected into responses that carry neither `result` nor `error`
pub const OK_SENTINEL: &str = "__OK__";

/// Encode any serializable message to a JSON string
pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Encode a request envelope to JSON
pub fn encode_request(req: &JsonRpcRequest) -> Result<String> {
    encode(req)
}

/// Decode a response body to a JSON value
///
/// # Errors
///
/// A body that is not JSON is reported as [`Error::Protocol`]: the server
/// answered, but not in the protocol.
pub fn decode_body(body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body)
        .map_err(|e| Error::Protocol(format!("response body is not valid JSON: {}", e)))
}

/// JavaScript-style truthiness, which is what the server-side convention
/// for "no result" amounts to
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Patch a decoded response so a strict JSON-RPC parser accepts it
///
/// Objects with a truthy `result` or any `error` key come back unchanged.
/// Every other object gets `result` set to [`OK_SENTINEL`], keeping all its
/// other fields. Non-objects are returned as-is and later classify as
/// invalid.
///
/// # Examples
///
/// ```rust
/// use odoo_jrpc_core::codec::{normalize_response, OK_SENTINEL};
/// use serde_json::json;
///
/// let patched = normalize_response(json!({"jsonrpc": "2.0", "id": 1}));
/// assert_eq!(patched["result"], OK_SENTINEL);
/// assert_eq!(patched["id"], 1);
/// ```
pub fn normalize_response(raw: Value) -> Value {
    match raw {
        Value::Object(mut fields) => {
            let has_result = fields.get("result").map_or(false, is_truthy);
            if has_result || fields.contains_key("error") {
                return Value::Object(fields);
            }
            fields.insert("result".to_string(), Value::String(OK_SENTINEL.to_string()));
            Value::Object(fields)
        }
        other => other,
    }
}

/// Classify a (normalized) response against the JSON-RPC 2.0 grammar
pub fn classify(value: &Value) -> JsonRpcMessage {
    let Some(fields) = value.as_object() else {
        return invalid("response is not a JSON object");
    };

    match fields.get("jsonrpc").and_then(Value::as_str) {
        Some(JSONRPC_VERSION) => {}
        Some(other) => return invalid(format!("unsupported jsonrpc version {:?}", other)),
        None => return invalid("missing jsonrpc version"),
    }

    if let Some(method) = fields.get("method").and_then(Value::as_str) {
        let method = method.to_string();
        return if fields.contains_key("id") {
            JsonRpcMessage::Request { method }
        } else {
            JsonRpcMessage::Notification { method }
        };
    }

    let id = match fields.get("id") {
        Some(raw_id) => match serde_json::from_value::<Id>(raw_id.clone()) {
            Ok(id) => id,
            Err(_) => return invalid("id must be a string, a number or null"),
        },
        None => return invalid("missing id"),
    };

    match (fields.get("result"), fields.get("error")) {
        (Some(_), Some(_)) => invalid("response has both result and error"),
        (None, Some(error)) if error.is_object() => JsonRpcMessage::Error {
            id,
            error: error.clone(),
        },
        (None, Some(_)) => invalid("error must be an object"),
        (Some(result), None) => JsonRpcMessage::Success {
            id,
            result: result.clone(),
        },
        (None, None) => invalid("response has neither result nor error"),
    }
}

/// Map a classified response to the caller-facing outcome
///
/// - `Success` -> the result value
/// - `Error` -> [`Error::Remote`]
/// - `Invalid` -> [`Error::Protocol`] naming the grammar violation
/// - anything else -> [`Error::Protocol`] reporting an unexpected response
pub fn into_result(message: JsonRpcMessage) -> Result<Value> {
    match message {
        JsonRpcMessage::Success { result, .. } => Ok(result),
        JsonRpcMessage::Error { error, .. } => Err(RemoteErrorData::from_value(&error).into()),
        JsonRpcMessage::Invalid { reason } => {
            Err(Error::Protocol(format!("invalid JSON-RPC response: {}", reason)))
        }
        other => Err(Error::Protocol(format!(
            "unexpected JSON-RPC response of type {}",
            other.kind()
        ))),
    }
}

/// Full response path: decode, normalize, classify, map
pub fn decode_response(body: &[u8]) -> Result<Value> {
    let raw = decode_body(body)?;
    into_result(classify(&normalize_response(raw)))
}

fn invalid(reason: impl Into<String>) -> JsonRpcMessage {
    JsonRpcMessage::Invalid {
        reason: reason.into(),
    }
}
