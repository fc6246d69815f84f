//! Client builder for configuring transport and observability
//!
//! The `ClientBuilder` provides a fluent API for configuring an
//! [`OdooClient`] before use. It allows you to:
//! - Supply the HTTP transport (otherwise the built-in one is used)
//! - Configure observability (OpenTelemetry)
//! - Set service name for telemetry
//!
//! Building never touches the network; the first request happens on
//! `login` or `call`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use odoo_jrpc_client::ClientBuilder;
//!
//! # fn example() -> odoo_jrpc_core::Result<()> {
//! // Built-in transport
//! let client = ClientBuilder::new("https://erp.example.com", "prod").build()?;
//!
//! // With observability
//! let client2 = ClientBuilder::new("https://erp.example.com", "prod")
//!     .with_default_observability()
//!     .service_name("invoice-sync")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::metrics::ClientMetrics;
use crate::session::SessionState;
use crate::transport::{resolve_transport, HttpTransport};
use crate::OdooClient;
use odoo_jrpc_core::{Error, ObservabilityConfig, ObservabilityError, Result};
use std::sync::Arc;

/// Builder for configuring and creating an OdooClient
pub struct ClientBuilder {
    host: String,
    db: String,
    transport: Option<Arc<dyn HttpTransport>>,
    observability_config: Option<ObservabilityConfig>,
    service_name: Option<String>,
}

impl ClientBuilder {
    /// Create a new client builder
    ///
    /// `host` is the server root (`https://erp.example.com`); a trailing
    /// slash is dropped so paths can be appended as-is.
    pub fn new(host: impl Into<String>, db: impl Into<String>) -> Self {
        let host = host.into().trim_end_matches('/').to_string();
        Self {
            host,
            db: db.into(),
            transport: None,
            observability_config: None,
            service_name: None,
        }
    }

    /// Use this transport instead of the built-in one
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Enable OpenTelemetry observability with custom configuration
    pub fn with_observability(mut self, config: ObservabilityConfig) -> Self {
        self.observability_config = Some(config);
        self
    }

    /// Enable OpenTelemetry observability with default configuration
    pub fn with_default_observability(mut self) -> Self {
        self.observability_config = Some(ObservabilityConfig::default());
        self
    }

    /// Set service name for observability (used if observability is enabled)
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Resolve the transport and build the client
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when no transport was supplied and none is
    /// built in, or when observability fails to initialize. A tracing
    /// subscriber installed earlier (by another client or by the
    /// application) is reused, not an error.
    pub fn build(self) -> Result<OdooClient> {
        let transport = resolve_transport(self.transport)?;

        let metrics = if let Some(mut config) = self.observability_config {
            if let Some(name) = self.service_name {
                config.service_name = name;
            }

            match odoo_jrpc_core::init_observability(config.clone()) {
                Ok(()) => {}
                Err(ObservabilityError::AlreadyInitialized) => {
                    tracing::debug!("Reusing the installed tracing subscriber");
                }
                Err(e) => {
                    return Err(Error::Configuration(format!(
                        "Failed to initialize observability: {}",
                        e
                    )));
                }
            }

            Some(Arc::new(ClientMetrics::new(config.service_name)))
        } else {
            None
        };

        tracing::debug!(host = %self.host, db = %self.db, "Client built");

        Ok(OdooClient {
            host: self.host,
            db: self.db,
            transport,
            session: SessionState::new(),
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpRequest, HttpResponse};
    use async_trait::async_trait;

    struct EchoTransport;

    #[async_trait]
    impl HttpTransport for EchoTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse> {
            Ok(HttpResponse::new(200))
        }
    }

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::new("http://localhost:8069", "odoo");

        assert_eq!(builder.host, "http://localhost:8069");
        assert_eq!(builder.db, "odoo");
        assert!(builder.transport.is_none());
        assert!(builder.observability_config.is_none());
        assert!(builder.service_name.is_none());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let builder = ClientBuilder::new("http://localhost:8069/", "odoo");
        assert_eq!(builder.host, "http://localhost:8069");
    }

    #[test]
    fn test_builder_with_transport() {
        let builder =
            ClientBuilder::new("http://localhost:8069", "odoo").transport(Arc::new(EchoTransport));
        assert!(builder.transport.is_some());

        let client = builder.build().unwrap();
        assert_eq!(client.host(), "http://localhost:8069");
        assert_eq!(client.db(), "odoo");
        assert!(client.metrics.is_none());
    }

    #[test]
    fn test_builder_observability_config() {
        let config = ObservabilityConfig::new("test-client").with_log_level("debug");
        let builder =
            ClientBuilder::new("http://localhost:8069", "odoo").with_observability(config);

        let obs_config = builder.observability_config.unwrap();
        assert_eq!(obs_config.service_name, "test-client");
        assert_eq!(obs_config.log_level, "debug");
    }

    #[test]
    fn test_builder_chaining() {
        let builder = ClientBuilder::new("http://localhost:8069", "odoo")
            .transport(Arc::new(EchoTransport))
            .service_name("test-service")
            .with_default_observability();

        assert!(builder.transport.is_some());
        assert!(builder.observability_config.is_some());
        assert_eq!(builder.service_name, Some("test-service".to_string()));
    }

    #[test]
    fn test_two_observed_clients() {
        let config = ObservabilityConfig::new("test-observed")
            .with_logs(false)
            .with_log_level("warn");

        for _ in 0..2 {
            let client = ClientBuilder::new("http://localhost:8069", "odoo")
                .transport(Arc::new(EchoTransport))
                .with_observability(config.clone())
                .build()
                .unwrap();
            assert!(client.metrics.is_some());
        }
    }

    #[tokio::test]
    async fn test_new_client_is_unauthenticated() {
        let client = ClientBuilder::new("http://localhost:8069", "odoo")
            .transport(Arc::new(EchoTransport))
            .build()
            .unwrap();

        assert!(!client.is_authenticated().await);
        assert!(client.session_cookie().await.is_none());
        assert_eq!(client.last_request_id().await, 0);
    }
}
