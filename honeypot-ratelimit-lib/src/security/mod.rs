pub mod rate_limit;

pub use rate_limit::{
    InboundRequest, LimitReason, RateLimitKeys, RateLimitResult, RateLimiter, RateLimiterMetrics,
    TickDriver,
};
