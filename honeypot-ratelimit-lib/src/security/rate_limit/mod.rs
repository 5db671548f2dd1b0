//! Admission control for honeypot listeners.
//!
//! Every inbound request is counted in two independent dimensions before anything expensive
//! (rule matching, response synthesis, language-model lookups) happens:
//!
//! - **Identity**: keyed by honeypot listener, destination port and source address, so one
//!   attacker hammering one simulated service is throttled there without affecting others.
//! - **Content**: keyed by the normalized content fingerprint, so a flood of identical
//!   payloads is throttled even when it is spread over many source addresses.
//!
//! # Architecture
//!
//! 1. **BucketedCounter** (`counter.rs`): a window split into equal slots, slot 0 current.
//!
//! 2. **RateDimension** (`dimension.rs`): key to counter map enforcing a per-slot and a
//!    per-window ceiling, evicting keys whose window has fully decayed.
//!
//! 3. **RateLimiter** (`limiter.rs`): evaluates identity then content and reports the first
//!    denial as a [`LimitReason`].
//!
//! 4. **TickDriver** (`tick.rs`): ages both dimensions by one slot per slot duration.
//!
//! # Example Usage
//!
//! ```ignore
//! use honeypot_ratelimit_lib::security::rate_limit::{
//!     InboundRequest, RateLimiter, RateLimitResult, TickDriver,
//! };
//!
//! let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit, metrics)?);
//! let ticks = TickDriver::start(limiter.clone(), limiter.slot_duration());
//!
//! match limiter.evaluate(&request) {
//!     RateLimitResult::Allowed => { /* match rules, synthesize response */ }
//!     RateLimitResult::Limited { reason } => { /* log and answer cheaply */ }
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [rate_limit]
//! window_seconds = 3600
//! slot_seconds = 60
//!
//! [rate_limit.identity]
//! max_per_window = 3000
//! max_per_slot = 100
//!
//! [rate_limit.content]
//! max_per_window = 5000
//! max_per_slot = 200
//! ```

mod counter;
mod dimension;
mod keys;
mod limiter;
pub mod metrics;
mod tick;

pub use counter::BucketedCounter;
pub use dimension::{DimensionConfig, DimensionKind, RateDimension, Verdict, MAX_SLOTS};
pub use keys::{identity_key, InboundRequest, RateLimitKeys};
pub use limiter::{LimitReason, RateLimitResult, RateLimiter};
pub use metrics::RateLimiterMetrics;
pub use tick::{Advance, TickDriver};
