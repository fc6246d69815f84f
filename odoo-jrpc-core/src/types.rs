//! JSON-RPC wire types as spoken by Odoo's HTTP controllers
//!
//! Odoo exposes its web controllers through a JSON-RPC dialect: every request
//! uses the literal protocol method `"call"` and the real operation is
//! selected by the HTTP path (`/web/session/authenticate`,
//! `/web/dataset/call_kw`) and by the contents of `params`.
//!
//! # Request IDs
//!
//! The server ignores request ids; the client uses them only to correlate
//! envelopes in its own logs. They are plain integers that start at 1 and
//! grow by one per outgoing call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The only protocol-level method name Odoo's controllers accept
pub const RPC_METHOD: &str = "call";

/// JSON-RPC protocol version written into every envelope
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC response id
///
/// Requests always carry numeric ids, but a response may echo anything the
/// protocol allows (string, number or null).
///
/// # Examples
///
/// ```rust
/// use odoo_jrpc_core::Id;
///
/// let id: Id = 42u64.into();
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier
    String(String),
    /// Numeric identifier
    Number(i64),
    /// Null identifier
    Null,
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<u64> for Id {
    /// Values above `i64::MAX` wrap; request ids never get near that.
    fn from(n: u64) -> Self {
        Id::Number(n as i64)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

/// JSON-RPC request envelope
///
/// `method` is always [`RPC_METHOD`]; the remote operation travels in
/// `params` or in the HTTP path.
///
/// # Examples
///
/// ```rust
/// use odoo_jrpc_core::JsonRpcRequest;
/// use serde_json::json;
///
/// let req = JsonRpcRequest::call(1, json!({"db": "prod"}));
/// assert_eq!(req.method, "call");
/// assert_eq!(req.id, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version - always "2.0"
    pub jsonrpc: String,
    /// Client-side correlation id
    pub id: u64,
    /// Protocol method - always "call"
    pub method: String,
    /// Controller parameters
    pub params: serde_json::Value,
}

impl JsonRpcRequest {
    /// Build a `"call"` envelope with the given id and params
    pub fn call(id: u64, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: RPC_METHOD.to_string(),
            params,
        }
    }
}

/// A decoded response after normalization, classified by shape
///
/// The server is only expected to send `Success` or `Error`; the other
/// variants exist so a response that looks like a request, or that breaks the
/// grammar entirely, is reported instead of silently accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonRpcMessage {
    /// Successful response carrying a result
    Success {
        /// Echoed id
        id: Id,
        /// Returned value
        result: serde_json::Value,
    },
    /// Error response carrying the raw error object
    Error {
        /// Echoed id
        id: Id,
        /// Raw `error` object
        error: serde_json::Value,
    },
    /// Something that looks like a request (has `method` and `id`)
    Request {
        /// Request method name
        method: String,
    },
    /// Something that looks like a notification (has `method`, no `id`)
    Notification {
        /// Notification method name
        method: String,
    },
    /// Does not match the JSON-RPC 2.0 grammar
    Invalid {
        /// Why classification failed
        reason: String,
    },
}

impl JsonRpcMessage {
    /// Check if this message is a success response
    pub fn is_success(&self) -> bool {
        matches!(self, JsonRpcMessage::Success { .. })
    }

    /// Check if this message is an error response
    pub fn is_error(&self) -> bool {
        matches!(self, JsonRpcMessage::Error { .. })
    }

    /// Check if this message failed classification
    pub fn is_invalid(&self) -> bool {
        matches!(self, JsonRpcMessage::Invalid { .. })
    }

    /// Label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            JsonRpcMessage::Success { .. } => "success",
            JsonRpcMessage::Error { .. } => "error",
            JsonRpcMessage::Request { .. } => "request",
            JsonRpcMessage::Notification { .. } => "notification",
            JsonRpcMessage::Invalid { .. } => "invalid",
        }
    }
}
