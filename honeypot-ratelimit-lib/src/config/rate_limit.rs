use serde::Deserialize;
use std::time::Duration;

use crate::security::rate_limit::DimensionConfig;

/// Rate limiting configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RateLimitConfig {
    /// Sliding window length in seconds
    /// Must be an exact multiple of `slot_seconds`
    /// Default: 3600 (1 hour)
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
    /// Slot length in seconds; the limiter ages its windows once per slot
    /// Shared by both dimensions
    /// Default: 60
    #[serde(default = "default_slot_seconds")]
    pub slot_seconds: u64,
    /// Limits keyed by honeypot listener, port and source address
    #[serde(default = "default_identity_limits")]
    pub identity: DimensionLimits,
    /// Limits keyed by the normalized request content fingerprint
    #[serde(default = "default_content_limits")]
    pub content: DimensionLimits,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_window_seconds(),
            slot_seconds: default_slot_seconds(),
            identity: default_identity_limits(),
            content: default_content_limits(),
        }
    }
}

impl RateLimitConfig {
    /// Resolve the identity and content dimension settings, applying window inheritance.
    pub fn dimensions(&self) -> (DimensionConfig, DimensionConfig) {
        (self.identity.resolve(self), self.content.resolve(self))
    }
}

/// Per-dimension limits
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DimensionLimits {
    /// Window override for this dimension in seconds
    /// If not specified, uses `rate_limit.window_seconds`
    #[serde(default)]
    pub window_seconds: Option<u64>,
    /// Maximum requests per key across the whole window
    pub max_per_window: u64,
    /// Maximum requests per key within a single slot
    pub max_per_slot: u64,
}

impl DimensionLimits {
    fn resolve(&self, global: &RateLimitConfig) -> DimensionConfig {
        DimensionConfig {
            window: Duration::from_secs(self.window_seconds.unwrap_or(global.window_seconds)),
            slot: Duration::from_secs(global.slot_seconds),
            max_per_window: self.max_per_window,
            max_per_slot: self.max_per_slot,
        }
    }
}

fn default_window_seconds() -> u64 {
    3600
}

fn default_slot_seconds() -> u64 {
    60
}

fn default_identity_limits() -> DimensionLimits {
    DimensionLimits { window_seconds: None, max_per_window: 3000, max_per_slot: 100 }
}

fn default_content_limits() -> DimensionLimits {
    DimensionLimits { window_seconds: None, max_per_window: 5000, max_per_slot: 200 }
}
