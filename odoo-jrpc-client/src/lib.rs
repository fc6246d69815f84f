//! Odoo JSON-RPC client over HTTP
//!
//! This crate logs into an Odoo server and calls model methods through its
//! JSON-RPC web controllers.
//!
//! # Core Features
//!
//! - **Session authentication**: `login` stores the user and the
//!   `session_id` cookie; later calls send it back
//! - **Model calls**: `call` / `call_typed` through `/web/dataset/call_kw`,
//!   with the user context injected into `kwargs`
//! - **Pluggable transport**: any [`HttpTransport`]; `reqwest` by default
//! - **Typed errors**: bad credentials, remote exceptions and protocol
//!   violations are distinct [`Error`](odoo_jrpc_core::Error) variants
//! - **Observability**: `tracing` spans and optional OpenTelemetry metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use odoo_jrpc_client::{CallOptions, OdooClient};
//! use serde_json::{json, Map};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OdooClient::builder("http://localhost:8069", "odoo").build()?;
//!
//!     let user = client.login("admin", "admin").await?;
//!     println!("uid {} in company {}", user.uid, user.company_id);
//!
//!     let count = client
//!         .call("res.partner", "search_count", &[json!([])], &Map::new(), CallOptions::default())
//!         .await?;
//!     println!("{} partners", count);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Concurrency
//!
//! A client may be cloned and used from many tasks. Session state is guarded
//! by a mutex, and a response to an older request never overwrites the
//! session cookie or user stored from a newer one.

mod client;
mod client_builder;
mod metrics;
mod session;
mod transport;
mod user;

pub use client::{CallOptions, OdooClient, AUTHENTICATE_PATH, CALL_KW_PATH, HTTP_LOG_TARGET};
pub use client_builder::ClientBuilder;
pub use metrics::ClientMetrics;
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, MISSING_TRANSPORT};
pub use user::{LoggedUser, UserContext};
