//! Credit ledger and pending coin pulse counter.
//!
//! Both types are shared between the control loop and hardware handlers, so
//! every read-modify-write is a single atomic operation. No lock is taken on
//! any path.
//!
//! # Invariant
//!
//! The committed credit never exceeds [`THRESHOLD`]. An increment that would
//! overshoot is rejected as a whole and leaves the ledger unchanged.
//!
//! ```
//! use paylock_core::{CreditLedger, IncrementOutcome};
//!
//! let ledger = CreditLedger::new();
//! assert_eq!(ledger.try_increment(45), IncrementOutcome::Accepted { total: 45 });
//! assert_eq!(
//!     ledger.try_increment(10),
//!     IncrementOutcome::Rejected { current: 45, attempted: 10 }
//! );
//! assert_eq!(ledger.current(), 45);
//! ```

use std::sync::atomic::{AtomicU32, Ordering};

use crate::constants::{COIN_PULSE_VALUE, THRESHOLD};

/// Result of an increment attempt against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementOutcome {
    /// The increment was committed; `total` is the new credit.
    Accepted { total: u32 },

    /// The increment would have overshot the threshold and was dropped.
    Rejected { current: u32, attempted: u32 },
}

impl IncrementOutcome {
    /// Whether the increment was committed.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Accumulated credit, bounded by [`THRESHOLD`].
#[derive(Debug, Default)]
pub struct CreditLedger {
    amount: AtomicU32,
}

impl CreditLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            amount: AtomicU32::new(0),
        }
    }

    /// Current credit.
    pub fn current(&self) -> u32 {
        self.amount.load(Ordering::Acquire)
    }

    /// Credit that starts an unlock cycle.
    pub fn threshold(&self) -> u32 {
        THRESHOLD
    }

    /// Add `amount` if the result stays within the threshold.
    ///
    /// The check and the update are one compare-and-swap, so concurrent
    /// callers can never jointly push the ledger past the threshold.
    pub fn try_increment(&self, amount: u32) -> IncrementOutcome {
        let result = self
            .amount
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current
                    .checked_add(amount)
                    .filter(|&total| total <= THRESHOLD)
            });

        match result {
            Ok(previous) => IncrementOutcome::Accepted {
                total: previous + amount,
            },
            Err(current) => IncrementOutcome::Rejected {
                current,
                attempted: amount,
            },
        }
    }

    /// Apply a batch of coin pulses as one increment.
    ///
    /// Same accept/reject rule as [`try_increment`](Self::try_increment); a
    /// rejected batch is dropped as a whole, never partially applied.
    pub fn drain_pending_coins(&self, pulses: u32) -> IncrementOutcome {
        self.try_increment(pulses.saturating_mul(COIN_PULSE_VALUE))
    }

    /// Clear the credit after a completed unlock cycle.
    pub fn reset(&self) {
        self.amount.store(0, Ordering::Release);
    }

    /// Whether the credit reached the unlock threshold.
    pub fn has_reached_threshold(&self) -> bool {
        self.current() >= THRESHOLD
    }
}

/// Coin pulses accepted by the coin handler and not yet applied.
///
/// Written by the coin handler, drained only by the control loop.
#[derive(Debug, Default)]
pub struct PendingPulses {
    count: AtomicU32,
}

impl PendingPulses {
    pub fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// Record one pulse, returning the pending count including it.
    pub fn record(&self) -> u32 {
        let previous = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(n.saturating_add(1))
            })
            .unwrap_or_else(|n| n);
        previous.saturating_add(1)
    }

    /// Read and clear the pending count in one step.
    ///
    /// Pulses recorded after the swap stay pending for the next drain.
    pub fn drain(&self) -> u32 {
        self.count.swap(0, Ordering::AcqRel)
    }

    /// Pending count without clearing it.
    pub fn peek(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }
}
