//! Two-dimensional admission control.
//!
//! This module composes an identity [`RateDimension`] and a content [`RateDimension`] into
//! the limiter the request path calls, and defines the result and denial types it returns.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use super::dimension::{DimensionConfig, DimensionKind, RateDimension, Verdict};
use super::keys::RateLimitKeys;
use super::metrics::RateLimiterMetrics;
use crate::config::RateLimitConfig;
use crate::error::{RateLimitError, Result};

/// Why a request was denied.
///
/// These are classifications, not faults: the caller decides whether a denial means dropping
/// the connection, answering with a generic busy response or just skipping expensive work.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitReason {
    #[error("identity slot limit exceeded")]
    IdentitySlotLimitExceeded,
    #[error("identity window limit exceeded")]
    IdentityWindowLimitExceeded,
    #[error("content slot limit exceeded")]
    ContentSlotLimitExceeded,
    #[error("content window limit exceeded")]
    ContentWindowLimitExceeded,
}

impl LimitReason {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitReason::IdentitySlotLimitExceeded => "identity_slot",
            LimitReason::IdentityWindowLimitExceeded => "identity_window",
            LimitReason::ContentSlotLimitExceeded => "content_slot",
            LimitReason::ContentWindowLimitExceeded => "content_window",
        }
    }

    /// The dimension that produced the denial.
    pub fn dimension(&self) -> DimensionKind {
        match self {
            LimitReason::IdentitySlotLimitExceeded | LimitReason::IdentityWindowLimitExceeded => {
                DimensionKind::Identity
            }
            LimitReason::ContentSlotLimitExceeded | LimitReason::ContentWindowLimitExceeded => {
                DimensionKind::Content
            }
        }
    }

    fn from_verdict(kind: DimensionKind, verdict: Verdict) -> Option<Self> {
        match (kind, verdict) {
            (_, Verdict::Allowed) => None,
            (DimensionKind::Identity, Verdict::WindowLimitExceeded) => {
                Some(LimitReason::IdentityWindowLimitExceeded)
            }
            (DimensionKind::Identity, Verdict::SlotLimitExceeded) => {
                Some(LimitReason::IdentitySlotLimitExceeded)
            }
            (DimensionKind::Content, Verdict::WindowLimitExceeded) => {
                Some(LimitReason::ContentWindowLimitExceeded)
            }
            (DimensionKind::Content, Verdict::SlotLimitExceeded) => {
                Some(LimitReason::ContentSlotLimitExceeded)
            }
        }
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed to proceed.
    Allowed,
    /// Request is rate limited.
    Limited {
        /// First ceiling the request ran into
        reason: LimitReason,
    },
}

impl RateLimitResult {
    /// Returns true if the request is allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed)
    }

    /// Returns true if the request is limited.
    pub fn is_limited(&self) -> bool {
        matches!(self, RateLimitResult::Limited { .. })
    }

    /// Get the denial reason if limited.
    pub fn reason(&self) -> Option<LimitReason> {
        match self {
            RateLimitResult::Limited { reason } => Some(*reason),
            RateLimitResult::Allowed => None,
        }
    }
}

/// Sliding-window rate limiter keyed by attacker identity and by request content.
///
/// A single instance is shared by every connection task. Time only moves when
/// [`RateLimiter::advance_time`] is called, which the
/// [`TickDriver`](super::tick::TickDriver) does once per slot.
///
/// # Example
/// ```ignore
/// use honeypot_ratelimit_lib::security::rate_limit::RateLimitResult;
///
/// match limiter.evaluate(&request) {
///     RateLimitResult::Allowed => { /* serve the request */ }
///     RateLimitResult::Limited { reason } => {
///         tracing::info!(%reason, "skipping response synthesis");
///     }
/// }
/// ```
pub struct RateLimiter {
    identity: RateDimension,
    content: RateDimension,
    metrics: Arc<RateLimiterMetrics>,
}

impl RateLimiter {
    /// Create a new rate limiter.
    ///
    /// # Errors
    /// Fails if either window is not a positive exact multiple of its slot, if any limit is
    /// zero, or if the two dimensions use different slot durations (one tick serves both).
    pub fn new(
        identity: DimensionConfig,
        content: DimensionConfig,
        metrics: Arc<RateLimiterMetrics>,
    ) -> Result<Self> {
        let identity = RateDimension::new(
            DimensionKind::Identity,
            identity,
            metrics.tracked_keys(DimensionKind::Identity),
        )?;
        let content = RateDimension::new(
            DimensionKind::Content,
            content,
            metrics.tracked_keys(DimensionKind::Content),
        )?;

        if identity.config().slot != content.config().slot {
            return Err(RateLimitError::SlotMismatch {
                identity: identity.config().slot,
                content: content.config().slot,
            });
        }

        Ok(Self { identity, content, metrics })
    }

    /// Build a limiter from the `[rate_limit]` configuration section.
    pub fn from_config(config: &RateLimitConfig, metrics: Arc<RateLimiterMetrics>) -> Result<Self> {
        let (identity, content) = config.dimensions();
        Self::new(identity, content, metrics)
    }

    /// Count `request` in both dimensions and decide whether it may proceed.
    ///
    /// The identity dimension is evaluated first. When it denies, the content dimension is not
    /// touched and spends none of its quota.
    pub fn evaluate<R: RateLimitKeys + ?Sized>(&self, request: &R) -> RateLimitResult {
        let identity_key = request.identity_key();
        let verdict = self.identity.evaluate(&identity_key);
        if let Some(reason) = LimitReason::from_verdict(DimensionKind::Identity, verdict) {
            return self.limited(reason, &identity_key);
        }

        let content_key = request.content_key();
        let verdict = self.content.evaluate(content_key);
        if let Some(reason) = LimitReason::from_verdict(DimensionKind::Content, verdict) {
            return self.limited(reason, content_key);
        }

        self.metrics.record_allowed();
        RateLimitResult::Allowed
    }

    fn limited(&self, reason: LimitReason, key: &str) -> RateLimitResult {
        debug!(reason = reason.as_str(), key, "Request rate limited");
        self.metrics.record_limited(reason);
        RateLimitResult::Limited { reason }
    }

    /// Age both dimensions by one slot.
    ///
    /// Must be called once per [`RateLimiter::slot_duration`]; the limiter never schedules
    /// this on its own.
    pub fn advance_time(&self) {
        let start = Instant::now();
        let identity_evicted = self.identity.advance();
        let content_evicted = self.content.advance();
        self.metrics.record_tick(start.elapsed().as_secs_f64());

        if identity_evicted > 0 || content_evicted > 0 {
            debug!(identity_evicted, content_evicted, "Evicted idle rate limit keys");
        }
    }

    /// Duration of one slot, shared by both dimensions.
    pub fn slot_duration(&self) -> Duration {
        self.identity.config().slot
    }

    pub fn identity(&self) -> &RateDimension {
        &self.identity
    }

    pub fn content(&self) -> &RateDimension {
        &self.content
    }
}
