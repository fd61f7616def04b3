//! Metrics collection and exposition.
//!
//! # Metrics
//! - `route_refresh_total` (counter): refresh cycles by source, outcome
//! - `route_catalog_apps` / `route_catalog_templates` (gauge): catalog size
//! - `route_tenant_bindings` (gauge): tenant table size
//! - `route_cache_lookups_total` (counter): cache hits and misses by cache
//! - `route_cache_entries` (gauge): live entries by cache
//! - `route_resolutions_total` (counter): lookups by source, outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup
//! - Labels are static strings to keep cardinality bounded

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with an HTTP scrape endpoint.
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// `source`: catalog | tenants | entry_rules | activities.
pub fn record_refresh(source: &'static str, outcome: &'static str) {
    metrics::counter!("route_refresh_total", "source" => source, "outcome" => outcome).increment(1);
}

pub fn record_catalog_size(apps: usize, templates: usize) {
    metrics::gauge!("route_catalog_apps").set(apps as f64);
    metrics::gauge!("route_catalog_templates").set(templates as f64);
}

pub fn record_tenant_bindings(count: usize) {
    metrics::gauge!("route_tenant_bindings").set(count as f64);
}

pub fn record_cache_lookup(cache: &'static str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("route_cache_lookups_total", "cache" => cache, "result" => result).increment(1);
}

pub fn record_cache_size(cache: &'static str, entries: usize) {
    metrics::gauge!("route_cache_entries", "cache" => cache).set(entries as f64);
}

/// `source`: catalog | entry_rules | activities.
pub fn record_resolution(source: &'static str, outcome: &'static str) {
    metrics::counter!("route_resolutions_total", "source" => source, "outcome" => outcome).increment(1);
}
