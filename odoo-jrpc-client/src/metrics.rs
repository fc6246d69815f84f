//! Client metrics definitions
//!
//! OpenTelemetry instruments recorded by [`OdooClient`](crate::OdooClient)
//! when the builder is given an observability configuration:
//!
//! - **requests_total**: RPC round trips, by path and status (counter)
//! - **request_duration**: RPC latency in seconds (histogram)
//! - **errors_total**: failed calls, by error kind (counter)
//! - **logins_total**: login attempts, by outcome (counter)
//!
//! # Examples
//!
//! ```rust,no_run
//! use odoo_jrpc_client::ClientMetrics;
//!
//! let metrics = ClientMetrics::new("crm-bridge");
//! metrics.record_request("/web/dataset/call_kw", "success", 0.12);
//! ```

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    InstrumentationScope, KeyValue,
};

/// Client metrics for monitoring
pub struct ClientMetrics {
    /// Total number of RPC round trips
    pub requests_total: Counter<u64>,
    /// RPC duration in seconds
    pub request_duration: Histogram<f64>,
    /// Total number of failed calls
    pub errors_total: Counter<u64>,
    /// Total number of login attempts
    pub logins_total: Counter<u64>,
}

impl ClientMetrics {
    /// Create metrics on the global meter provider
    pub fn new(service_name: impl Into<String>) -> Self {
        let scope = InstrumentationScope::builder(service_name.into()).build();
        let meter = global::meter_with_scope(scope);
        Self::new_with_meter(&meter)
    }

    /// Create metrics on a specific meter
    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            requests_total: meter
                .u64_counter("odoo_jrpc.client.requests.total")
                .with_description("Total number of JSON-RPC round trips")
                .build(),
            request_duration: meter
                .f64_histogram("odoo_jrpc.client.request.duration")
                .with_description("JSON-RPC round trip duration in seconds")
                .with_unit("s")
                .build(),
            errors_total: meter
                .u64_counter("odoo_jrpc.client.errors.total")
                .with_description("Total number of failed calls by error kind")
                .build(),
            logins_total: meter
                .u64_counter("odoo_jrpc.client.logins.total")
                .with_description("Total number of login attempts by outcome")
                .build(),
        }
    }

    /// Record one round trip
    pub fn record_request(&self, path: &str, status: &str, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("path", path.to_string()),
            KeyValue::new("status", status.to_string()),
        ];
        self.requests_total.add(1, attributes);
        self.request_duration.record(duration_secs, attributes);
    }

    /// Record a failed call
    pub fn record_error(&self, kind: &str) {
        self.errors_total
            .add(1, &[KeyValue::new("kind", kind.to_string())]);
    }

    /// Record a login attempt (`success`, `invalid_credentials`, `error`)
    pub fn record_login(&self, outcome: &str) {
        self.logins_total
            .add(1, &[KeyValue::new("outcome", outcome.to_string())]);
    }
}
