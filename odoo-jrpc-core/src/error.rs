//! Error types for odoo-jrpc
//!
//! Every failure a caller can observe is one variant of [`Error`]. The set is
//! closed so callers can branch on the kind of failure:
//!
//! - **Configuration**: no HTTP transport could be resolved at construction
//! - **Authentication**: bad credentials, or a call made before `login`
//! - **Remote**: the server reported an application error
//! - **Protocol**: the response is not a usable JSON-RPC response
//! - **Transport**: the HTTP layer rejected the request
//! - **Serialization**: caller-supplied params or typed results failed to
//!   (de)serialize locally
//!
//! # Remote errors
//!
//! Odoo reports application failures as a JSON-RPC error object whose
//! interesting part lives under `data`:
//!
//! ```json
//! {"code": 200, "message": "Odoo Server Error",
//!  "data": {"name": "odoo.exceptions.ValidationError",
//!           "message": "bad value", "debug": "Traceback ..."}}
//! ```
//!
//! [`RemoteErrorData::from_value`] extracts the name, message and debug
//! payload from that shape while tolerating missing fields.
//!
//! # Examples
//!
//! ```rust
//! use odoo_jrpc_core::{Error, RemoteErrorData};
//! use serde_json::json;
//!
//! let data = RemoteErrorData::from_value(&json!({
//!     "data": {"name": "ValidationError", "message": "bad value"}
//! }));
//! let error: Error = data.into();
//! assert_eq!(error.to_string(), "ValidationError: bad value");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for odoo-jrpc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Remote error name used when the server gives neither `data.name` nor a
/// top-level `message`.
pub const UNKNOWN_REMOTE_ERROR: &str = "UnknownError";

/// Why an authentication-related operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthenticationFailure {
    /// The server accepted the login request but returned no user id
    InvalidCredentials,
    /// An authenticated call was attempted without a logged-in user
    NotAuthenticated,
}

impl std::fmt::Display for AuthenticationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthenticationFailure::InvalidCredentials => write!(f, "incorrect credentials"),
            AuthenticationFailure::NotAuthenticated => write!(f, "not authenticated"),
        }
    }
}

/// Application-level error type for odoo-jrpc operations
///
/// Errors carry owned strings rather than source errors so they stay
/// `Clone` and can be handed to several observers (logs, metrics, caller).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// No usable HTTP transport
    ///
    /// Raised by the client builder, never after construction.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Authentication failed or is missing
    #[error("Authentication error: {0}")]
    Authentication(AuthenticationFailure),

    /// Application error reported by the server
    ///
    /// Displays as `name: message`; the structured fields stay available
    /// for callers that need to branch on the remote exception name.
    #[error("{name}: {message}")]
    Remote {
        /// Remote exception name (e.g. `odoo.exceptions.ValidationError`)
        name: String,
        /// Human-readable message
        message: String,
        /// Optional server-side traceback
        debug: Option<String>,
    },

    /// Malformed or unrecognized JSON-RPC response
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The HTTP transport rejected the request
    #[error("Transport error: {0}")]
    Transport(String),

    /// Local serialization or deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Short, stable label for the error kind
    ///
    /// Used as a metric attribute and in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::Authentication(_) => "authentication",
            Error::Remote { .. } => "remote",
            Error::Protocol(_) => "protocol",
            Error::Transport(_) => "transport",
            Error::Serialization(_) => "serialization",
        }
    }

    /// Name of the remote exception, if this is a remote error
    pub fn remote_name(&self) -> Option<&str> {
        match self {
            Error::Remote { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Structured view of a server-reported error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteErrorData {
    /// Remote exception name
    pub name: String,
    /// Human-readable message
    pub message: String,
    /// Optional server-side traceback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

impl RemoteErrorData {
    /// Extract name, message and debug from a JSON-RPC `error` value
    ///
    /// `data.name` falls back to the top-level `message`, then to
    /// [`UNKNOWN_REMOTE_ERROR`]. `data.message` falls back to the top-level
    /// `message`, then to an empty string. `data.debug` is kept only when it
    /// is a string.
    pub fn from_value(error: &serde_json::Value) -> Self {
        let top_message = error.get("message").and_then(|m| m.as_str());
        let data = error.get("data");
        let data_str = |key: &str| data.and_then(|d| d.get(key)).and_then(|v| v.as_str());

        let name = data_str("name")
            .or(top_message)
            .unwrap_or(UNKNOWN_REMOTE_ERROR)
            .to_string();
        let message = data_str("message")
            .or(top_message)
            .unwrap_or_default()
            .to_string();
        let debug = data_str("debug").map(str::to_string);

        Self {
            name,
            message,
            debug,
        }
    }
}

impl From<RemoteErrorData> for Error {
    fn from(data: RemoteErrorData) -> Self {
        Error::Remote {
            name: data.name,
            message: data.message,
            debug: data.debug,
        }
    }
}
