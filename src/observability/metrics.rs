//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define error page metrics (requests, latency, cache, render failures)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `error_pages_requests_total` (counter): requests by format, status
//! - `error_pages_request_duration_seconds` (histogram): resolution latency
//! - `error_pages_cache_hits_total` / `error_pages_cache_misses_total` (counters)
//! - `error_pages_cache_entries` (gauge): entries left after the last sweep
//! - `error_pages_render_failures_total` (counter): failed renders by kind
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup
//! - Label values are static strings where possible

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::http::format::Format;

pub const REQUESTS_TOTAL: &str = "error_pages_requests_total";
pub const REQUEST_DURATION: &str = "error_pages_request_duration_seconds";
pub const CACHE_HITS: &str = "error_pages_cache_hits_total";
pub const CACHE_MISSES: &str = "error_pages_cache_misses_total";
pub const CACHE_ENTRIES: &str = "error_pages_cache_entries";
pub const RENDER_FAILURES: &str = "error_pages_render_failures_total";

/// Install the Prometheus recorder and its HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!(REQUESTS_TOTAL, "Error pages served, by format and status");
    describe_histogram!(REQUEST_DURATION, "Time spent resolving an error page");
    describe_counter!(CACHE_HITS, "Rendered page cache hits");
    describe_counter!(CACHE_MISSES, "Rendered page cache misses");
    describe_gauge!(CACHE_ENTRIES, "Rendered pages held in the cache");
    describe_counter!(RENDER_FAILURES, "Template renders that failed");

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(format: Format, status: u16, start: Instant) {
    counter!(REQUESTS_TOTAL, "format" => format.as_str(), "status" => status.to_string()).increment(1);
    histogram!(REQUEST_DURATION).record(start.elapsed().as_secs_f64());
}

pub fn record_cache_hit() {
    counter!(CACHE_HITS).increment(1);
}

pub fn record_cache_miss() {
    counter!(CACHE_MISSES).increment(1);
}

pub fn set_cache_entries(entries: usize) {
    gauge!(CACHE_ENTRIES).set(entries as f64);
}

pub fn record_render_failure(format: Format) {
    counter!(RENDER_FAILURES, "format" => format.as_str()).increment(1);
}
