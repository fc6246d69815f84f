//! Core types and codec for talking JSON-RPC to Odoo
//!
//! This crate holds everything that does not need a network:
//!
//! - **Types**: the `"call"` request envelope and the classified response
//! - **Codec**: envelope encoding and the response path (decode, normalize,
//!   classify, map to a result or a typed error)
//! - **Cookie**: extraction of the `session_id` cookie from `Set-Cookie`
//! - **Error handling**: the closed error taxonomy shared by all crates
//! - **Observability**: tracing subscriber and OpenTelemetry bootstrap
//!
//! # Why a separate core?
//!
//! Odoo's JSON-RPC deviates from JSON-RPC 2.0 in one place (a successful
//! call with no return value omits `result`). Keeping the patch and the
//! parser here, away from the HTTP client, lets them be tested on plain
//! JSON values.
//!
//! # Example
//!
//! ```rust
//! use odoo_jrpc_core::{codec, Error, JsonRpcRequest};
//! use serde_json::json;
//!
//! let request = JsonRpcRequest::call(1, json!({"db": "prod", "login": "admin"}));
//! let wire = codec::encode_request(&request).unwrap();
//! assert!(wire.contains("\"method\":\"call\""));
//!
//! let body = br#"{"jsonrpc":"2.0","id":1,"error":{"data":{"name":"UserError","message":"no"}}}"#;
//! match codec::decode_response(body) {
//!     Err(Error::Remote { name, .. }) => assert_eq!(name, "UserError"),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

pub mod codec;
pub mod cookie;
pub mod error;
pub mod observability;
pub mod types;

pub use cookie::{find_session_cookie, SESSION_COOKIE_PREFIX};
pub use error::{AuthenticationFailure, Error, RemoteErrorData, Result};
pub use observability::{
    init_observability, shutdown_observability, ObservabilityConfig, ObservabilityError,
};
pub use types::{Id, JsonRpcMessage, JsonRpcRequest, JSONRPC_VERSION, RPC_METHOD};
