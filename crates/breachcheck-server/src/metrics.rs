//! Prometheus metrics
//!
//! Recording goes through the `metrics` facade and is a no-op until
//! [`init_prometheus_recorder`] installs the exporter.

use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::ServerError;

pub const LOOKUPS_TOTAL: &str = "breachcheck_lookups_total";
pub const LOOKUP_DURATION_SECONDS: &str = "breachcheck_lookup_duration_seconds";
pub const ADMIN_WRITES_TOTAL: &str = "breachcheck_admin_writes_total";
pub const CATALOG_BREACHES: &str = "breachcheck_catalog_breaches";

/// Install the global Prometheus recorder. Can only succeed once per process.
pub fn init_prometheus_recorder() -> Result<PrometheusHandle, ServerError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Internal(format!("failed to install metrics recorder: {e}")))
}

/// `outcome` is one of `found`, `not_found`, `rejected`, `error`.
pub fn record_lookup(kind: &'static str, outcome: &'static str, elapsed: Duration) {
    counter!(LOOKUPS_TOTAL, "kind" => kind, "outcome" => outcome).increment(1);
    histogram!(LOOKUP_DURATION_SECONDS, "kind" => kind).record(elapsed.as_secs_f64());
}

pub fn record_admin_write(op: &'static str, outcome: &'static str) {
    counter!(ADMIN_WRITES_TOTAL, "op" => op, "outcome" => outcome).increment(1);
}

pub fn set_catalog_size(breaches: usize) {
    gauge!(CATALOG_BREACHES).set(breaches as f64);
}
