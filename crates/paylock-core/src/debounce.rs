//! Time-window debounce filter for hardware signal lines.
//!
//! Mechanical contacts and long acceptor cables produce bursts of spurious
//! transitions. The filter accepts a transition only if strictly more than
//! `min_interval` elapsed since the last accepted one, and records the new
//! timestamp before returning so the same physical transition cannot be
//! counted twice.
//!
//! The filter is lock-free: it is shared by reference with the handler of its
//! signal line and never blocks.
//!
//! # Examples
//!
//! ```
//! use paylock_core::{DebounceFilter, Timestamp};
//! use std::time::Duration;
//!
//! let filter = DebounceFilter::new(Duration::from_millis(50));
//!
//! assert!(filter.should_accept(Timestamp::from_millis(1_000)));
//! assert!(!filter.should_accept(Timestamp::from_millis(1_030))); // bounce
//! assert!(!filter.should_accept(Timestamp::from_millis(1_050))); // window is inclusive
//! assert!(filter.should_accept(Timestamp::from_millis(1_051)));
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::Timestamp;

/// Marker for a filter that has not accepted any transition yet.
const NEVER: u64 = u64::MAX;

/// Debounce state of one signal line.
#[derive(Debug)]
pub struct DebounceFilter {
    /// Timestamp (ms) of the last accepted transition, or [`NEVER`].
    last_event: AtomicU64,

    /// Minimum interval between two accepted transitions.
    min_interval: Duration,
}

impl DebounceFilter {
    /// Create a filter that has not seen any transition.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_event: AtomicU64::new(NEVER),
            min_interval,
        }
    }

    /// Timestamp of the last accepted transition, if any.
    pub fn last_event(&self) -> Option<Timestamp> {
        match self.last_event.load(Ordering::Acquire) {
            NEVER => None,
            millis => Some(Timestamp::from_millis(millis)),
        }
    }

    /// Decide whether a transition stamped `now` is a real event.
    ///
    /// Returns `true` and records `now` as the last event if more than
    /// `min_interval` elapsed since the previous accepted transition. The first
    /// transition ever seen is always accepted. A stamp older than the last
    /// accepted one falls inside the window and is rejected.
    pub fn should_accept(&self, now: Timestamp) -> bool {
        let mut last = self.last_event.load(Ordering::Acquire);
        loop {
            if last != NEVER
                && now.saturating_since(Timestamp::from_millis(last)) <= self.min_interval
            {
                return false;
            }

            match self.last_event.compare_exchange_weak(
                last,
                now.as_millis(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => last = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEBOUNCE_INTERVAL_MS;
    use rstest::rstest;

    fn filter() -> DebounceFilter {
        DebounceFilter::new(Duration::from_millis(DEBOUNCE_INTERVAL_MS))
    }

    #[test]
    fn test_first_event_is_accepted() {
        let filter = filter();
        assert_eq!(filter.last_event(), None);
        assert!(filter.should_accept(Timestamp::ZERO));
        assert_eq!(filter.last_event(), Some(Timestamp::ZERO));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(25)]
    #[case(50)] // exactly the window is still a bounce
    fn test_second_event_inside_window_is_rejected(#[case] delta: u64) {
        let filter = filter();
        let t = Timestamp::from_millis(10_000);

        let accepted = [t, Timestamp::from_millis(10_000 + delta)]
            .into_iter()
            .filter(|&stamp| filter.should_accept(stamp))
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(filter.last_event(), Some(t));
    }

    #[rstest]
    #[case(51)]
    #[case(100)]
    #[case(60_000)]
    fn test_event_outside_window_is_accepted(#[case] delta: u64) {
        let filter = filter();
        assert!(filter.should_accept(Timestamp::from_millis(500)));
        assert!(filter.should_accept(Timestamp::from_millis(500 + delta)));
        assert_eq!(filter.last_event(), Some(Timestamp::from_millis(500 + delta)));
    }

    #[test]
    fn test_rejection_does_not_move_window() {
        let filter = filter();
        assert!(filter.should_accept(Timestamp::from_millis(0)));
        // A bounce at 40ms must not extend the window past 50ms.
        assert!(!filter.should_accept(Timestamp::from_millis(40)));
        assert!(filter.should_accept(Timestamp::from_millis(51)));
    }

    #[test]
    fn test_stale_timestamp_is_rejected() {
        let filter = filter();
        assert!(filter.should_accept(Timestamp::from_millis(1_000)));
        assert!(!filter.should_accept(Timestamp::from_millis(200)));
        assert_eq!(filter.last_event(), Some(Timestamp::from_millis(1_000)));
    }

    #[test]
    fn test_pulse_train_spaced_past_window() {
        let filter = filter();
        let accepted = (0..10u64)
            .map(|i| Timestamp::from_millis(i * 60))
            .filter(|&t| filter.should_accept(t))
            .count();
        assert_eq!(accepted, 10);
    }

    #[test]
    fn test_concurrent_callers_accept_once() {
        use std::sync::Arc;
        use std::thread;

        let filter = Arc::new(filter());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let filter = Arc::clone(&filter);
                thread::spawn(move || filter.should_accept(Timestamp::from_millis(7_000)))
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&accepted| accepted)
            .count();
        assert_eq!(accepted, 1);
    }
}
