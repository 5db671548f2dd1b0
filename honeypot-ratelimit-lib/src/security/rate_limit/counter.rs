//! The counter module contains the fixed-size slotted counter backing every tracked key.

/// A sliding window split into equal-duration slots.
///
/// Slot 0 is always the current slot, the one accruing new requests. Higher indices hold
/// progressively older slots. The sum across all slots is the number of requests observed
/// since the oldest slot still in the window was opened.
///
/// The counter knows nothing about wall-clock time: it only moves forward when
/// [`BucketedCounter::advance`] is called by its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketedCounter {
    slots: Box<[u64]>,
}

impl BucketedCounter {
    /// Create a zero-filled counter with `slots` slots.
    ///
    /// Callers validate `slots >= 1` when the window configuration is built; a zero-length
    /// counter is still handled gracefully (all operations become no-ops returning 0).
    pub fn new(slots: usize) -> Self {
        Self { slots: vec![0; slots].into_boxed_slice() }
    }

    /// Number of slots in the window.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Add one request to the current slot.
    ///
    /// Saturates instead of wrapping; at realistic request rates the ceiling is never reached.
    pub fn increment_current(&mut self) {
        if let Some(current) = self.slots.first_mut() {
            *current = current.saturating_add(1);
        }
    }

    /// Requests recorded in the current slot.
    pub fn current(&self) -> u64 {
        self.slots.first().copied().unwrap_or_default()
    }

    /// Requests recorded across the whole window.
    pub fn sum(&self) -> u64 {
        self.slots
            .iter()
            .fold(0u64, |acc, count| acc.saturating_add(*count))
    }

    /// Age the window by one slot and return the remaining sum.
    ///
    /// Every slot moves one position older, the oldest value falls off the end and a fresh
    /// zeroed slot becomes current.
    pub fn advance(&mut self) -> u64 {
        if self.slots.is_empty() {
            return 0;
        }
        self.slots.rotate_right(1);
        if let Some(current) = self.slots.first_mut() {
            *current = 0;
        }
        self.sum()
    }

    /// Raw slot values, current slot first.
    pub fn slots(&self) -> &[u64] {
        &self.slots
    }
}
