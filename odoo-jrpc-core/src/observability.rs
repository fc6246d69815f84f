//! Logging, tracing and metrics bootstrap
//!
//! The library itself only emits `tracing` events and OpenTelemetry metric
//! instruments; nothing is printed or exported until the embedding
//! application installs a subscriber. This module offers a ready-made one:
//!
//! - an `EnvFilter` driven by `RUST_LOG` (or [`ObservabilityConfig::log_level`])
//! - a JSON `fmt` layer for local structured logs
//! - optionally, an OTLP span exporter bridged through `tracing-opentelemetry`
//! - optionally, an OTLP meter provider feeding the client metrics
//!
//! # Usage
//!
//! ```rust,no_run
//! use odoo_jrpc_core::ObservabilityConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ObservabilityConfig::new("invoice-sync")
//!         .with_endpoint("http://localhost:4317")
//!         .with_log_level("odoo_jrpc=debug,info");
//!
//!     odoo_jrpc_core::init_observability(config).expect("Failed to init observability");
//!
//!     // ... talk to Odoo ...
//!
//!     odoo_jrpc_core::shutdown_observability();
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: collector endpoint
//! - `RUST_LOG`: log filter directives

use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Providers installed by [`init_observability`], kept for shutdown
static PROVIDERS: Mutex<Option<Providers>> = Mutex::new(None);

struct Providers {
    tracer: Option<SdkTracerProvider>,
    meter: Option<SdkMeterProvider>,
}

/// Observability configuration
///
/// # Defaults
///
/// - Service name: "odoo-jrpc"
/// - Service version: the crate version
/// - OTLP endpoint: `$OTEL_EXPORTER_OTLP_ENDPOINT` or "http://localhost:4317"
/// - Traces and metrics disabled, logs enabled
/// - Log level: `$RUST_LOG` or "info"
///
/// Exporting is opt-in because a client library is usually embedded in an
/// application that may not run a collector.
///
/// # Examples
///
/// ```rust
/// use odoo_jrpc_core::ObservabilityConfig;
///
/// let config = ObservabilityConfig::new("crm-bridge")
///     .with_traces(true)
///     .with_log_level("debug");
/// assert!(config.enable_traces);
/// ```
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name attached to spans and metrics
    pub service_name: String,
    /// Service version attached to spans and metrics
    pub service_version: String,
    /// OTLP/gRPC collector endpoint
    pub otlp_endpoint: String,
    /// Export spans over OTLP
    pub enable_traces: bool,
    /// Export metrics over OTLP
    pub enable_metrics: bool,
    /// Write JSON logs to stdout
    pub enable_logs: bool,
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "odoo-jrpc".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
            enable_traces: false,
            enable_metrics: false,
            enable_logs: true,
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl ObservabilityConfig {
    /// Create a configuration with a custom service name and default settings
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the OTLP collector endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = endpoint.into();
        self
    }

    /// Set the log filter used when `RUST_LOG` is unset
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the service version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Enable or disable span export
    pub fn with_traces(mut self, enable: bool) -> Self {
        self.enable_traces = enable;
        self
    }

    /// Enable or disable metric export
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Enable or disable local JSON logs
    pub fn with_logs(mut self, enable: bool) -> Self {
        self.enable_logs = enable;
        self
    }

    fn resource(&self) -> Resource {
        Resource::builder_empty()
            .with_attributes(vec![
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                    self.service_name.clone(),
                ),
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                    self.service_version.clone(),
                ),
            ])
            .build()
    }
}

/// Why [`init_observability`] did not install anything
#[derive(Debug, Error)]
pub enum ObservabilityError {
    /// A global tracing subscriber was installed earlier, by this crate or
    /// by the host application
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,

    /// The log filter directives do not parse
    #[error("invalid log filter: {0}")]
    Filter(String),

    /// An OTLP exporter could not be built
    #[error("failed to build OTLP exporter: {0}")]
    Exporter(String),
}

/// Install the tracing subscriber and, if enabled, the OTLP providers
///
/// Call once at startup. The global tracer and meter providers are only
/// installed once the subscriber is in place; on any error nothing global
/// has changed.
///
/// # Errors
///
/// [`ObservabilityError::AlreadyInitialized`] when a global subscriber
/// already exists, otherwise a filter or exporter error.
pub fn init_observability(config: ObservabilityConfig) -> Result<(), ObservabilityError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| ObservabilityError::Filter(e.to_string()))?;

    let tracer_provider = if config.enable_traces {
        Some(build_tracer_provider(&config)?)
    } else {
        None
    };

    let meter_provider = if config.enable_metrics {
        Some(build_meter_provider(&config)?)
    } else {
        None
    };

    if init_tracing_subscriber(&config, env_filter, tracer_provider.as_ref()).is_err() {
        if let Some(provider) = tracer_provider {
            let _ = provider.shutdown();
        }
        if let Some(provider) = meter_provider {
            let _ = provider.shutdown();
        }
        return Err(ObservabilityError::AlreadyInitialized);
    }

    if let Some(provider) = &tracer_provider {
        global::set_tracer_provider(provider.clone());
    }
    if let Some(provider) = &meter_provider {
        global::set_meter_provider(provider.clone());
    }

    if let Ok(mut providers) = PROVIDERS.lock() {
        *providers = Some(Providers {
            tracer: tracer_provider,
            meter: meter_provider,
        });
    }

    tracing::info!(
        service_name = %config.service_name,
        otlp_endpoint = %config.otlp_endpoint,
        traces = config.enable_traces,
        metrics = config.enable_metrics,
        logs = config.enable_logs,
        "Observability initialized"
    );

    Ok(())
}

fn build_tracer_provider(
    config: &ObservabilityConfig,
) -> Result<SdkTracerProvider, ObservabilityError> {
    use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()
        .map_err(|e| ObservabilityError::Exporter(e.to_string()))?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(config.resource())
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .build())
}

fn build_meter_provider(
    config: &ObservabilityConfig,
) -> Result<SdkMeterProvider, ObservabilityError> {
    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()
        .map_err(|e| ObservabilityError::Exporter(e.to_string()))?;

    let reader = opentelemetry_sdk::metrics::PeriodicReader::builder(exporter)
        .with_interval(Duration::from_secs(30))
        .build();

    Ok(SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(config.resource())
        .build())
}

fn init_tracing_subscriber(
    config: &ObservabilityConfig,
    env_filter: EnvFilter,
    tracer_provider: Option<&SdkTracerProvider>,
) -> Result<(), TryInitError> {
    use opentelemetry::trace::TracerProvider as _;

    let telemetry_layer = tracer_provider.map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
    });

    let fmt_layer = config.enable_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .json()
    });

    tracing_subscriber::registry()
        .with(telemetry_layer)
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
}

/// Flush and shut down the providers installed by [`init_observability`]
///
/// Safe to call more than once; later calls do nothing.
pub fn shutdown_observability() {
    let providers = match PROVIDERS.lock() {
        Ok(mut guard) => guard.take(),
        Err(_) => None,
    };
    let Some(providers) = providers else {
        return;
    };

    if let Some(tracer) = providers.tracer {
        if let Err(e) = tracer.shutdown() {
            tracing::warn!(error = %e, "Tracer provider shutdown failed");
        }
    }
    if let Some(meter) = providers.meter {
        if let Err(e) = meter.shutdown() {
            tracing::warn!(error = %e, "Meter provider shutdown failed");
        }
    }
    tracing::info!("Observability shut down");
}
