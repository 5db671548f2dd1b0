use opentelemetry::global;
use opentelemetry::metrics::{Meter, MeterProvider};
use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::Registry;
use std::sync::Arc;

use crate::error::{RateLimitError, Result};
use crate::security::rate_limit::RateLimiterMetrics;

pub const METER_NAME: &str = "honeypot-ratelimit";

pub mod labels {
    pub const OUTCOME: &str = "outcome";
    pub const REASON: &str = "reason";
    pub const DIMENSION: &str = "dimension";
    pub const VERSION: &str = "version";
    pub const RUST_VERSION: &str = "rust_version";
}

pub mod values {
    pub const OUTCOME_ALLOWED: &str = "allowed";
    pub const OUTCOME_LIMITED: &str = "limited";
}

/// Build a meter provider whose instruments are exported into `registry`.
///
/// The provider must be kept alive for as long as its instruments are recorded and scraped.
pub fn build_meter_provider(registry: &Registry) -> Result<SdkMeterProvider> {
    let exporter = opentelemetry_prometheus::exporter()
        .with_registry(registry.clone())
        .build()
        .map_err(|e| RateLimitError::Metrics(format!("Failed to build Prometheus exporter: {e}")))?;

    Ok(SdkMeterProvider::builder().with_reader(exporter).build())
}

/// Build rate limiter instruments on a caller-owned provider.
pub fn rate_limiter_metrics(provider: &SdkMeterProvider) -> Arc<RateLimiterMetrics> {
    let meter = provider.meter(METER_NAME);
    Arc::new(RateLimiterMetrics::new(&meter))
}

/// Set build info metric with version labels
pub fn record_build_info(meter: &Meter) {
    let build_info = meter
        .u64_gauge("honeypot_ratelimit_build_info")
        .with_description("Build information (version, rust version)")
        .build();

    build_info.record(
        1,
        &[
            KeyValue::new(labels::VERSION, env!("CARGO_PKG_VERSION")),
            KeyValue::new(labels::RUST_VERSION, env!("CARGO_PKG_RUST_VERSION")),
        ],
    );
}

/// Install a global meter provider backed by a fresh Prometheus registry.
pub fn init_metrics() -> Result<(Arc<RateLimiterMetrics>, Registry)> {
    let registry = Registry::default();
    let meter_provider = build_meter_provider(&registry)?;

    global::set_meter_provider(meter_provider);

    let meter = global::meter(METER_NAME);
    let metrics = Arc::new(RateLimiterMetrics::new(&meter));

    record_build_info(&meter);

    Ok((metrics, registry))
}
