use serde::Deserialize;

use super::rate_limit::RateLimitConfig;
use super::telemetry::{LoggingConfig, TelemetryConfig};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Rate limiting windows and ceilings
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Telemetry configuration
    /// Controls metrics and observability endpoints
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
