//! odoo-jrpc - Odoo JSON-RPC over HTTP
//!
//! This is the main convenience crate that re-exports the odoo-jrpc
//! sub-crates. Use it if you want a single dependency.
//!
//! # Architecture
//!
//! - **odoo-jrpc-core**: envelope types, codec, session cookie parsing,
//!   error taxonomy, observability
//! - **odoo-jrpc-client**: the HTTP client, its session state and transports
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use odoo_jrpc::{CallOptions, Error, OdooClient};
//! use serde_json::{json, Map};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OdooClient::builder("http://localhost:8069", "odoo").build()?;
//!
//!     match client.login("admin", "admin").await {
//!         Ok(user) => println!("logged in as {}", user.name),
//!         Err(Error::Authentication(reason)) => return Err(reason.to_string().into()),
//!         Err(e) => return Err(e.into()),
//!     }
//!
//!     let mut kwargs = Map::new();
//!     kwargs.insert("fields".into(), json!(["name"]));
//!     let partners = client
//!         .call("res.partner", "search_read", &[json!([])], &kwargs, CallOptions::default())
//!         .await?;
//!     println!("{}", partners);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `reqwest` (default): built-in transport. Without it, supply an
//!   [`HttpTransport`] through [`ClientBuilder::transport`].

pub use odoo_jrpc_client as client;
pub use odoo_jrpc_core as core;

pub use odoo_jrpc_client::{
    CallOptions, ClientBuilder, HttpRequest, HttpResponse, HttpTransport, LoggedUser, OdooClient,
    UserContext,
};
pub use odoo_jrpc_core::{AuthenticationFailure, Error, ObservabilityConfig, Result};
