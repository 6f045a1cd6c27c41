//! Prometheus metrics for the poller and the board endpoints.
//!
//! This module provides metrics for:
//! - Upstream fetch outcomes and latency
//! - Snapshot size
//! - Timestamps dropped by the presentation pipeline
//! - Board render latency and failures

use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Upstream fetch latency metric name.
pub const METRIC_FETCH_LATENCY: &str = "upstream_fetch_latency_ms";
/// Board render latency metric name.
pub const METRIC_RENDER_LATENCY: &str = "board_render_latency_ms";
/// Successful fetches counter metric name.
pub const METRIC_FETCHES_SUCCEEDED: &str = "upstream_fetches_succeeded_total";
/// Failed fetches counter metric name.
pub const METRIC_FETCHES_FAILED: &str = "upstream_fetches_failed_total";
/// Cached entries gauge metric name.
pub const METRIC_SNAPSHOT_ENTRIES: &str = "snapshot_entries";
/// Dropped timestamps counter metric name.
pub const METRIC_TIMESTAMPS_DROPPED: &str = "timestamps_dropped_total";
/// Render failures counter metric name.
pub const METRIC_RENDER_FAILURES: &str = "board_render_failures_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_FETCH_LATENCY,
        "Upstream death-times request latency in milliseconds"
    );
    describe_histogram!(
        METRIC_RENDER_LATENCY,
        "Time to build and render the board in milliseconds"
    );

    describe_counter!(
        METRIC_FETCHES_SUCCEEDED,
        "Total number of successful upstream fetches"
    );
    describe_counter!(
        METRIC_FETCHES_FAILED,
        "Total number of failed upstream fetches"
    );
    describe_counter!(
        METRIC_TIMESTAMPS_DROPPED,
        "Total number of death timestamps that failed to parse"
    );
    describe_counter!(
        METRIC_RENDER_FAILURES,
        "Total number of board responses that failed to render"
    );

    describe_gauge!(
        METRIC_SNAPSHOT_ENTRIES,
        "Number of bosses in the cached snapshot"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and return a handle for scraping.
pub fn install_prometheus() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Record upstream fetch latency.
pub fn record_fetch_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_FETCH_LATENCY).record(latency_ms);
}

/// Increment successful fetches counter.
pub fn inc_fetches_succeeded() {
    counter!(METRIC_FETCHES_SUCCEEDED).increment(1);
}

/// Increment failed fetches counter.
pub fn inc_fetches_failed() {
    counter!(METRIC_FETCHES_FAILED).increment(1);
}

/// Set the cached entries gauge.
pub fn set_snapshot_entries(count: usize) {
    gauge!(METRIC_SNAPSHOT_ENTRIES).set(count as f64);
}

/// Increment dropped timestamps counter.
pub fn inc_timestamps_dropped() {
    counter!(METRIC_TIMESTAMPS_DROPPED).increment(1);
}

/// Increment render failures counter.
pub fn inc_render_failures(endpoint: &'static str) {
    counter!(METRIC_RENDER_FAILURES, "endpoint" => endpoint).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
    endpoint: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric and endpoint label.
    pub fn new(metric_name: &'static str, endpoint: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
            endpoint,
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name, "endpoint" => self.endpoint).record(latency_ms);
    }
}

/// Create a latency timer for a board render.
pub fn timer_render(endpoint: &'static str) -> LatencyTimer {
    LatencyTimer::new(METRIC_RENDER_LATENCY, endpoint)
}
