//! Prometheus metrics for request and data-file load tracking.
//!
//! This module provides:
//! - Per-route request counters
//! - Data file load latency
//! - Data file load failure counters

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// HTTP error responses counter metric name.
pub const METRIC_HTTP_ERRORS: &str = "http_errors_total";
/// Data file load latency metric name.
pub const METRIC_FILE_LOAD_LATENCY: &str = "data_file_load_latency_ms";
/// Data file load failures counter metric name.
pub const METRIC_FILE_LOAD_FAILURES: &str = "data_file_load_failures_total";

/// Initialize all metric descriptions.
/// Call this once at startup, after a recorder is installed.
pub fn init_metrics() {
    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of API requests by route");
    describe_counter!(
        METRIC_HTTP_ERRORS,
        "Total number of API error responses by route and status"
    );
    describe_histogram!(
        METRIC_FILE_LOAD_LATENCY,
        "Time to read and parse a data file in milliseconds"
    );
    describe_counter!(
        METRIC_FILE_LOAD_FAILURES,
        "Total number of data files that failed to read or parse"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and return its render handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Increment the request counter for a route.
pub fn inc_requests(route: &'static str) {
    counter!(METRIC_HTTP_REQUESTS, "route" => route).increment(1);
}

/// Increment the error counter for a route.
pub fn inc_errors(route: &'static str, status: u16) {
    counter!(METRIC_HTTP_ERRORS, "route" => route, "status" => status.to_string()).increment(1);
}

/// Increment the file load failure counter.
pub fn inc_file_load_failures(file: &str) {
    counter!(METRIC_FILE_LOAD_FAILURES, "file" => file.to_string()).increment(1);
}

/// RAII guard for timing a data file load.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    file: String,
}

impl LatencyTimer {
    /// Create a new latency timer for the given file.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            file: file.into(),
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.elapsed_ms();
        histogram!(METRIC_FILE_LOAD_LATENCY, "file" => self.file.clone()).record(latency_ms);
    }
}
