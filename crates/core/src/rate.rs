//! Write-rate budget
//!
//! Keeps the lifetime write count of the record rotation area within the
//! flash's erase-cycle budget. The instantaneous rate is the number of writes
//! made so far (the record id) spread over the time since the very first
//! write.

use crate::config::SECONDS_PER_DAY;

/// Check whether writing record `id` at `timestamp` exceeds the budget
///
/// Decision order:
/// 1. The very first write (`timestamp == first_timestamp`, `id == 0`) is
///    never limited.
/// 2. A clock that has not advanced past `first_timestamp`, or an id at the
///    all-ones sentinel, is always too fast.
/// 3. Otherwise `id * SECONDS_PER_DAY / (timestamp - first_timestamp)` is
///    compared with `max_writes_per_day`.
///
/// # Example
///
/// ```
/// use sprinkler_core::rate::writing_too_fast;
///
/// assert!(!writing_too_fast(0, 0, 0, 200));
/// assert!(writing_too_fast(0, 0, 1, 200));
/// assert!(!writing_too_fast(86_400, 0, 1, 200));
/// ```
pub fn writing_too_fast(timestamp: u32, first_timestamp: u32, id: u32, max_writes_per_day: u32) -> bool {
    if timestamp == first_timestamp && id == 0 {
        return false;
    }

    if timestamp <= first_timestamp || id == u32::MAX {
        return true;
    }

    let lifetime = u64::from(timestamp - first_timestamp);
    let writes_per_day = u64::from(id) * u64::from(SECONDS_PER_DAY) / lifetime;

    writes_per_day > u64::from(max_writes_per_day)
}

/// Start of the calendar day following `timestamp`
///
/// A rate-limited write is retried once the wall clock reaches this point.
pub fn next_day_start(timestamp: u32) -> u32 {
    let today = timestamp / SECONDS_PER_DAY;
    (today + 1).saturating_mul(SECONDS_PER_DAY)
}
