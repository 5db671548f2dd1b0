//! One independent axis of rate limiting.
//!
//! A [`RateDimension`] maps opaque keys to [`BucketedCounter`]s and enforces two ceilings on
//! each key: a per-slot ceiling that catches bursts and a per-window ceiling that catches
//! sustained volume.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use ahash::AHashMap;
use opentelemetry::metrics::UpDownCounter;
use tracing::{debug, warn};

use super::counter::BucketedCounter;
use crate::error::{RateLimitError, Result};

/// Which axis a dimension limits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionKind {
    /// Keyed by honeypot listener, port and source address.
    Identity,
    /// Keyed by the normalized content fingerprint of the request.
    Content,
}

impl DimensionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionKind::Identity => "identity",
            DimensionKind::Content => "content",
        }
    }
}

/// Upper bound on slots per window: a day of one-second slots. Every tracked key holds one
/// counter per slot, so larger windows must use coarser slots.
pub const MAX_SLOTS: usize = 86_400;

/// Limits and timing of a single dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionConfig {
    /// Total span over which volume is bounded
    pub window: Duration,
    /// Duration of one slot; also the tick period
    pub slot: Duration,
    /// Requests allowed across the whole window
    pub max_per_window: u64,
    /// Requests allowed within the current slot
    pub max_per_slot: u64,
}

impl DimensionConfig {
    /// Validate the configuration and return the number of slots in the window.
    pub fn slot_count(&self, kind: DimensionKind) -> Result<usize> {
        let invalid_window = || RateLimitError::InvalidWindow {
            dimension: kind.as_str(),
            window: self.window,
            slot: self.slot,
        };

        if self.window.is_zero() || self.slot.is_zero() {
            return Err(invalid_window());
        }

        let window_nanos = self.window.as_nanos();
        let slot_nanos = self.slot.as_nanos();
        if window_nanos.checked_rem(slot_nanos) != Some(0) {
            return Err(invalid_window());
        }

        if self.max_per_window == 0 {
            return Err(RateLimitError::Config(format!(
                "{} max_per_window must be > 0",
                kind.as_str()
            )));
        }
        if self.max_per_slot == 0 {
            return Err(RateLimitError::Config(format!(
                "{} max_per_slot must be > 0",
                kind.as_str()
            )));
        }

        let slots = window_nanos.checked_div(slot_nanos).ok_or_else(invalid_window)?;
        match usize::try_from(slots) {
            Ok(slots) if slots <= MAX_SLOTS => Ok(slots),
            _ => Err(RateLimitError::Config(format!(
                "{} window has too many slots: {slots} (max {MAX_SLOTS})",
                kind.as_str()
            ))),
        }
    }
}

/// Outcome of evaluating a key against one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    WindowLimitExceeded,
    SlotLimitExceeded,
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }
}

/// A key-to-counter map with per-slot and per-window ceilings.
///
/// # Thread Safety
///
/// The map sits behind a single mutex. `evaluate` holds it for lookup plus increment and
/// `advance` holds it for the full sweep, so an increment can never be lost to a concurrent
/// shift and a sum is never read halfway through one. Nothing blocking happens under the
/// lock.
pub struct RateDimension {
    kind: DimensionKind,
    config: DimensionConfig,
    slots: usize,
    buckets: Mutex<AHashMap<String, BucketedCounter>>,
    tracked_keys: UpDownCounter<i64>,
}

impl RateDimension {
    /// Create a dimension, failing if the window is not a positive multiple of the slot or a
    /// limit is zero.
    ///
    /// `tracked_keys` is incremented whenever a key is first seen and decremented when it is
    /// evicted.
    pub fn new(
        kind: DimensionKind,
        config: DimensionConfig,
        tracked_keys: UpDownCounter<i64>,
    ) -> Result<Self> {
        let slots = config.slot_count(kind)?;
        Ok(Self { kind, config, slots, buckets: Mutex::new(AHashMap::new()), tracked_keys })
    }

    /// Count one request for `key` and check it against both ceilings.
    ///
    /// The window ceiling is checked first so that a key which has saturated its whole window
    /// reports [`Verdict::WindowLimitExceeded`] even when its current slot is also over.
    pub fn evaluate(&self, key: &str) -> Verdict {
        let mut buckets = self.lock();
        match buckets.get_mut(key) {
            Some(counter) => self.observe(counter),
            None => {
                let mut counter = BucketedCounter::new(self.slots);
                let verdict = self.observe(&mut counter);
                buckets.insert(key.to_owned(), counter);
                self.tracked_keys.add(1, &[]);
                debug!(dimension = self.kind.as_str(), key, "Tracking new rate limit key");
                verdict
            }
        }
    }

    fn observe(&self, counter: &mut BucketedCounter) -> Verdict {
        // The request is counted before either ceiling is checked and is not rolled back on
        // denial. A client that keeps probing while over quota keeps consuming quota and
        // cannot reopen its window early by retrying. Keep it increment-then-check.
        counter.increment_current();

        if counter.sum() > self.config.max_per_window {
            Verdict::WindowLimitExceeded
        } else if counter.current() > self.config.max_per_slot {
            Verdict::SlotLimitExceeded
        } else {
            Verdict::Allowed
        }
    }

    /// Age every tracked key by one slot, evicting keys whose window is now empty.
    ///
    /// Returns the number of evicted keys.
    pub fn advance(&self) -> usize {
        let mut buckets = self.lock();
        let before = buckets.len();
        buckets.retain(|_, counter| counter.advance() > 0);
        let evicted = before.saturating_sub(buckets.len());

        if evicted > 0 {
            self.tracked_keys
                .add(i64::try_from(evicted).unwrap_or(i64::MAX).saturating_neg(), &[]);
        }
        evicted
    }

    fn lock(&self) -> MutexGuard<'_, AHashMap<String, BucketedCounter>> {
        match self.buckets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                // Counters are only mutated through complete single-statement updates, so the
                // map is consistent even if a holder panicked.
                warn!(dimension = self.kind.as_str(), "Rate limit dimension lock poisoned");
                let guard = poisoned.into_inner();
                self.buckets.clear_poison();
                guard
            }
        }
    }

    pub fn kind(&self) -> DimensionKind {
        self.kind
    }

    pub fn config(&self) -> &DimensionConfig {
        &self.config
    }

    /// Number of slots in each key's window.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Requests counted for `key` across its window, if the key is tracked.
    pub fn window_count(&self, key: &str) -> Option<u64> {
        self.lock().get(key).map(BucketedCounter::sum)
    }
}
