//! Client Selection
//!
//! Turns an optional caller hint into the order in which pool clients are
//! tried. Pinned calls start at the hinted index; unpinned calls share a
//! round-robin cursor.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Header carrying the caller's preferred key index
pub const PREFERRED_KEY_HEADER: &str = "x-ai-key-index";

/// Parse the transport-level key hint.
///
/// Only integers are accepted; anything else (empty, fractional, non-numeric)
/// means "no preference".
pub fn parse_preferred_key(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Map any integer onto a pool index using true modulo.
///
/// Returns `None` when there is no hint or the pool is empty.
pub fn normalize_preferred_index(value: Option<i64>, pool_size: usize) -> Option<usize> {
    let value = value?;
    if pool_size == 0 {
        return None;
    }
    let n = i64::try_from(pool_size).ok()?;
    usize::try_from(value.rem_euclid(n)).ok()
}

/// Shared round-robin position
#[derive(Debug, Default)]
pub struct RotationCursor {
    position: AtomicUsize,
}

impl RotationCursor {
    /// Create a cursor at index 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position
    pub fn current(&self) -> usize {
        self.position.load(Ordering::Relaxed)
    }

    /// Return the current position and advance by one, wrapping at `len`.
    ///
    /// Atomic, so concurrent callers each see a distinct start.
    pub fn advance(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.position
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |pos| {
                Some((pos % len + 1) % len)
            })
            .map(|prev| prev % len)
            .unwrap_or(0)
    }
}

/// Resolve the rotation order for one round.
///
/// A valid hint pins the start and leaves the cursor alone. Without one the
/// round starts at the cursor, which moves on by one.
pub fn resolve_order(cursor: &RotationCursor, preferred: Option<i64>, len: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let start = match normalize_preferred_index(preferred, len) {
        Some(index) => index,
        None => cursor.advance(len),
    };
    rotation_from(start, len)
}

/// `[start, start+1, ..., start+len-1]` modulo `len`
pub fn rotation_from(start: usize, len: usize) -> Vec<usize> {
    (0..len).map(|offset| (start + offset) % len).collect()
}
