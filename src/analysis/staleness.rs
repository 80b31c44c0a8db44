/// Reference staleness detection.
///
/// The nearest-match policy always returns something when a series is
/// non-empty, even if the closest row is days away from "now" because a
/// sheet stopped updating. This module flags such matches so the report
/// can say so instead of presenting old data as current.
///
/// Staleness is measured from the alignment target, not from the wall
/// clock, so the check stays deterministic in tests.

use crate::model::ReferencePoint;

/// Returns `true` if the matched observation is further than
/// `max_offset_minutes` from the reference target.
///
/// Staleness is strictly greater than the threshold:
///   offset > max_offset_minutes  →  stale
///   offset == max_offset_minutes →  not stale
///
/// An absent match is never stale; absence is reported separately.
pub fn is_stale_at(reference: &ReferencePoint, max_offset_minutes: u64) -> bool {
    match &reference.matched {
        Some(m) => m.offset.num_minutes() > i64::try_from(max_offset_minutes).unwrap_or(i64::MAX),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
