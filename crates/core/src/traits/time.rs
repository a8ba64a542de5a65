//! Time abstraction traits for platform-agnostic timing operations.
//!
//! Two clocks are involved in the record store:
//! - [`TimeSource`]: monotonic time since boot, drives deferred-task polling
//! - [`WallClock`]: unix time from the network, stamps records and events

use core::cell::Cell;

/// Platform-agnostic monotonic time source.
///
/// # Example
///
/// ```
/// use sprinkler_core::traits::{TimeSource, MockClock};
///
/// fn poll_due<T: TimeSource>(time: &T, last_poll_ms: &mut u64) -> bool {
///     if time.now_ms().saturating_sub(*last_poll_ms) >= 60_000 {
///         *last_poll_ms = time.now_ms();
///         return true;
///     }
///     false
/// }
///
/// let clock = MockClock::new();
/// let mut last = 0;
/// assert!(!poll_due(&clock, &mut last));
/// clock.advance_ms(60_000);
/// assert!(poll_due(&clock, &mut last));
/// ```
pub trait TimeSource: Clone + Send + Sync {
    /// Returns current time in milliseconds since system start.
    fn now_ms(&self) -> u64;
}

/// Wall-clock time provider.
///
/// Returns seconds since the unix epoch, or 0 while the clock has not been
/// synchronized yet.
pub trait WallClock {
    fn unix_timestamp(&self) -> u32;

    /// Whether the clock has been synchronized
    fn is_synchronized(&self) -> bool {
        self.unix_timestamp() != 0
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock clock for testing with controllable time advancement.
///
/// Provides both a monotonic [`TimeSource`] and a [`WallClock`]. The wall
/// clock starts unsynchronized (0) until [`MockClock::set_timestamp`] is
/// called.
///
/// # Example
///
/// ```
/// use sprinkler_core::traits::{MockClock, TimeSource, WallClock};
///
/// let clock = MockClock::new();
/// assert_eq!(clock.unix_timestamp(), 0);
///
/// clock.set_timestamp(1_000);
/// clock.advance_secs(60);
/// assert_eq!(clock.unix_timestamp(), 1_060);
/// assert_eq!(clock.now_ms(), 60_000);
/// ```
#[derive(Clone, Default)]
pub struct MockClock {
    current_ms: Cell<u64>,
    unix: Cell<u32>,
}

// Safety: MockClock is only used in single-threaded test contexts
// where Cell is safe. The Send+Sync bounds on TimeSource trait
// are required for embedded contexts, but MockClock is not used there.
unsafe impl Send for MockClock {}
unsafe impl Sync for MockClock {}

impl MockClock {
    /// Creates a new `MockClock` at boot, wall clock unsynchronized.
    pub fn new() -> Self {
        Self {
            current_ms: Cell::new(0),
            unix: Cell::new(0),
        }
    }

    /// Creates a new `MockClock` with a synchronized wall clock.
    pub fn with_timestamp(unix: u32) -> Self {
        let clock = Self::new();
        clock.set_timestamp(unix);
        clock
    }

    /// Sets the wall-clock time (0 = unsynchronized).
    pub fn set_timestamp(&self, unix: u32) {
        self.unix.set(unix);
    }

    /// Advances the monotonic clock only.
    pub fn advance_ms(&self, ms: u64) {
        self.current_ms.set(self.current_ms.get() + ms);
    }

    /// Advances both clocks; an unsynchronized wall clock stays at 0.
    pub fn advance_secs(&self, secs: u32) {
        self.current_ms.set(self.current_ms.get() + u64::from(secs) * 1_000);
        let unix = self.unix.get();
        if unix != 0 {
            self.unix.set(unix.saturating_add(secs));
        }
    }
}

impl TimeSource for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms.get()
    }
}

impl WallClock for MockClock {
    fn unix_timestamp(&self) -> u32 {
        self.unix.get()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_clock_initial_value() {
        let clock = MockClock::new();
        assert_eq!(clock.now_ms(), 0);
        assert_eq!(clock.unix_timestamp(), 0);
        assert!(!clock.is_synchronized());
    }

    #[test]
    fn mock_clock_with_timestamp() {
        let clock = MockClock::with_timestamp(123);
        assert_eq!(clock.unix_timestamp(), 123);
        assert!(clock.is_synchronized());
        assert_eq!(clock.now_ms(), 0);
    }

    #[test]
    fn mock_clock_advance_ms() {
        let clock = MockClock::with_timestamp(100);
        clock.advance_ms(1_500);

        assert_eq!(clock.now_ms(), 1_500);
        // Wall clock untouched
        assert_eq!(clock.unix_timestamp(), 100);
    }

    #[test]
    fn mock_clock_advance_secs() {
        let clock = MockClock::new();
        clock.advance_secs(10);

        // Unsynchronized wall clock stays unknown
        assert_eq!(clock.unix_timestamp(), 0);
        assert_eq!(clock.now_ms(), 10_000);

        clock.set_timestamp(1_000);
        clock.advance_secs(5);
        assert_eq!(clock.unix_timestamp(), 1_005);
        assert_eq!(clock.now_ms(), 15_000);
    }
}
