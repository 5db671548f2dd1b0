use opentelemetry::metrics::{Counter, Histogram, Meter, UpDownCounter};
use opentelemetry::KeyValue;

use super::dimension::DimensionKind;
use super::limiter::LimitReason;
use crate::telemetry::metrics::{labels, values};

pub const IDENTITY_KEYS: &str = "honeypot_ratelimit_identity_keys";
pub const CONTENT_KEYS: &str = "honeypot_ratelimit_content_keys";
// The Prometheus exporter appends `_total` to counters, so counter names carry no suffix.
pub const EVALUATIONS: &str = "honeypot_ratelimit_evaluations";
pub const LIMITED: &str = "honeypot_ratelimit_limited";
pub const TICKS: &str = "honeypot_ratelimit_ticks";
pub const TICK_DURATION_SECONDS: &str = "honeypot_ratelimit_tick_duration_seconds";

/// Bucket bounds for the tick sweep, in seconds: from 10µs for a near-empty limiter up to
/// multi-second sweeps over millions of keys.
const TICK_DURATION_BOUNDARIES: [f64; 12] =
    [0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0];

/// Instruments updated by the rate limiter.
///
/// The tracked-key gauges reflect how many keys each dimension currently holds, not request
/// volume. They exist for capacity planning and leak detection and are never read back by
/// the limiter itself.
#[derive(Clone)]
pub struct RateLimiterMetrics {
    identity_keys: UpDownCounter<i64>,
    content_keys: UpDownCounter<i64>,

    evaluations_total: Counter<u64>,
    limited_total: Counter<u64>,

    ticks_total: Counter<u64>,
    tick_duration_seconds: Histogram<f64>,
}

impl RateLimiterMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            identity_keys: meter
                .i64_up_down_counter(IDENTITY_KEYS)
                .with_description("Number of identity keys currently tracked by the rate limiter")
                .build(),
            content_keys: meter
                .i64_up_down_counter(CONTENT_KEYS)
                .with_description("Number of content keys currently tracked by the rate limiter")
                .build(),

            evaluations_total: meter
                .u64_counter(EVALUATIONS)
                .with_description("Total number of requests evaluated by the rate limiter")
                .build(),
            limited_total: meter
                .u64_counter(LIMITED)
                .with_description("Total number of requests denied by the rate limiter, by reason")
                .build(),

            ticks_total: meter
                .u64_counter(TICKS)
                .with_description("Total number of time advances applied to the rate limiter")
                .build(),
            tick_duration_seconds: meter
                .f64_histogram(TICK_DURATION_SECONDS)
                .with_description("Time spent aging and evicting tracked keys per tick")
                .with_boundaries(TICK_DURATION_BOUNDARIES.to_vec())
                .build(),
        }
    }

    /// Gauge tracking the key count of one dimension.
    pub fn tracked_keys(&self, kind: DimensionKind) -> UpDownCounter<i64> {
        match kind {
            DimensionKind::Identity => self.identity_keys.clone(),
            DimensionKind::Content => self.content_keys.clone(),
        }
    }

    pub fn record_allowed(&self) {
        self.evaluations_total
            .add(1, &[KeyValue::new(labels::OUTCOME, values::OUTCOME_ALLOWED)]);
    }

    pub fn record_limited(&self, reason: LimitReason) {
        self.evaluations_total
            .add(1, &[KeyValue::new(labels::OUTCOME, values::OUTCOME_LIMITED)]);
        self.limited_total.add(
            1,
            &[
                KeyValue::new(labels::REASON, reason.as_str()),
                KeyValue::new(labels::DIMENSION, reason.dimension().as_str()),
            ],
        );
    }

    pub fn record_tick(&self, duration_secs: f64) {
        self.ticks_total.add(1, &[]);
        self.tick_duration_seconds.record(duration_secs, &[]);
    }
}
