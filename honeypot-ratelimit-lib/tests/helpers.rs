//! Shared test helpers for rate limiter tests
#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use honeypot_ratelimit_lib::security::rate_limit::{DimensionConfig, RateLimiterMetrics};
use honeypot_ratelimit_lib::telemetry::{build_meter_provider, rate_limiter_metrics};
use honeypot_ratelimit_lib::{InboundRequest, RateLimiter};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Registry, TextEncoder};

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// A private registry plus the provider feeding it, so tests never touch global state.
pub struct MetricsHarness {
    pub registry: Registry,
    pub provider: SdkMeterProvider,
    pub metrics: Arc<RateLimiterMetrics>,
}

impl MetricsHarness {
    pub fn new() -> TestResult<Self> {
        let registry = Registry::new();
        let provider = build_meter_provider(&registry)?;
        let metrics = rate_limiter_metrics(&provider);
        Ok(Self { registry, provider, metrics })
    }

    /// Current value of a metric, summed over all its series. Absent metrics read as 0.
    pub fn value(&self, name: &str) -> f64 {
        metric_value(&self.registry, name)
    }

    /// Full Prometheus text exposition of the registry.
    pub fn exposition(&self) -> String {
        exposition(&self.registry)
    }

    pub fn identity_keys(&self) -> f64 {
        self.value("honeypot_ratelimit_identity_keys")
    }

    pub fn content_keys(&self) -> f64 {
        self.value("honeypot_ratelimit_content_keys")
    }
}

pub fn exposition(registry: &Registry) -> String {
    TextEncoder::new()
        .encode_to_string(&registry.gather())
        .unwrap_or_default()
}

pub fn metric_value(registry: &Registry, name: &str) -> f64 {
    exposition(registry)
        .lines()
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| {
            let (series, value) = line.rsplit_once(' ')?;
            let metric = series.split('{').next()?;
            if metric == name {
                value.parse::<f64>().ok()
            } else {
                None
            }
        })
        .sum()
}

pub fn dimension(
    window_secs: u64,
    slot_secs: u64,
    max_per_window: u64,
    max_per_slot: u64,
) -> DimensionConfig {
    DimensionConfig {
        window: Duration::from_secs(window_secs),
        slot: Duration::from_secs(slot_secs),
        max_per_window,
        max_per_slot,
    }
}

/// Limiter with a 5 second window of 1 second slots.
pub fn limiter(
    harness: &MetricsHarness,
    identity: (u64, u64),
    content: (u64, u64),
) -> TestResult<RateLimiter> {
    Ok(RateLimiter::new(
        dimension(5, 1, identity.0, identity.1),
        dimension(5, 1, content.0, content.1),
        harness.metrics.clone(),
    )?)
}

pub fn request(honeypot: [u8; 4], port: u16, source: [u8; 4], base_hash: &str) -> InboundRequest {
    InboundRequest {
        honeypot_ip: IpAddr::V4(Ipv4Addr::from(honeypot)),
        port,
        source_ip: IpAddr::V4(Ipv4Addr::from(source)),
        base_hash: base_hash.to_string(),
    }
}
