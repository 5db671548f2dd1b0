#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod security;
pub mod telemetry;

pub use config::{load_from_path, Config, RateLimitConfig};
pub use error::{RateLimitError, Result};
pub use security::rate_limit::{
    InboundRequest, LimitReason, RateLimitKeys, RateLimitResult, RateLimiter, RateLimiterMetrics,
    TickDriver,
};
