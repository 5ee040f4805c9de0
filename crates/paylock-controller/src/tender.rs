//! Shared tender state: the credit ledger, the pending coin pulses and the
//! acceptor gate.
//!
//! One `TenderState` is created at startup and shared through an `Arc`
//! between the control loop and both hardware handlers. Every operation is
//! lock-free.

use std::sync::atomic::{AtomicU32, Ordering};

use paylock_core::{CreditLedger, IncrementOutcome, PendingPulses};
use paylock_hardware::AcceptorInhibit;

use crate::gate::AcceptorGate;

/// Bill handler activity since the control loop last looked.
///
/// Handlers never log; they count, and the control loop reports the counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TenderActivity {
    /// Bills credited to the ledger.
    pub bills_credited: u32,

    /// Bills refused because they would overshoot the threshold.
    pub bills_rejected: u32,

    /// Failed attempts to inhibit the acceptors from a handler.
    pub inhibit_faults: u32,
}

impl TenderActivity {
    /// Whether anything happened.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Credit ledger, pending coin pulses and acceptor gate.
///
/// # Examples
///
/// ```
/// use paylock_controller::TenderState;
/// use paylock_hardware::mock::MockInhibit;
///
/// let (inhibit, lines) = MockInhibit::new();
/// let tender = TenderState::new(inhibit);
/// tender.gate().enable().unwrap();
///
/// assert!(tender.try_increment(45).is_accepted());
/// assert!(!tender.try_increment(10).is_accepted());
///
/// // The refused increment inhibited both acceptors.
/// assert_eq!(tender.credit(), 45);
/// assert!(!lines.is_enabled());
/// ```
#[derive(Debug)]
pub struct TenderState<I> {
    ledger: CreditLedger,
    pending: PendingPulses,
    gate: AcceptorGate<I>,
    bills_credited: AtomicU32,
    bills_rejected: AtomicU32,
    inhibit_faults: AtomicU32,
}

impl<I: AcceptorInhibit> TenderState<I> {
    /// Create an empty ledger with the acceptors inhibited.
    pub fn new(inhibit: I) -> Self {
        Self {
            ledger: CreditLedger::new(),
            pending: PendingPulses::new(),
            gate: AcceptorGate::new(inhibit),
            bills_credited: AtomicU32::new(0),
            bills_rejected: AtomicU32::new(0),
            inhibit_faults: AtomicU32::new(0),
        }
    }

    pub fn ledger(&self) -> &CreditLedger {
        &self.ledger
    }

    pub fn gate(&self) -> &AcceptorGate<I> {
        &self.gate
    }

    /// Current credit.
    pub fn credit(&self) -> u32 {
        self.ledger.current()
    }

    pub fn has_reached_threshold(&self) -> bool {
        self.ledger.has_reached_threshold()
    }

    /// Apply `amount` or, if it would overshoot, refuse it and inhibit both
    /// acceptors.
    pub fn try_increment(&self, amount: u32) -> IncrementOutcome {
        let outcome = self.ledger.try_increment(amount);
        self.inhibit_on_reject(outcome);
        outcome
    }

    /// Apply a drained batch of coin pulses with the same rule as
    /// [`try_increment`](Self::try_increment).
    pub fn drain_pending_coins(&self, pulses: u32) -> IncrementOutcome {
        let outcome = self.ledger.drain_pending_coins(pulses);
        self.inhibit_on_reject(outcome);
        outcome
    }

    /// Count one coin pulse. Coin handler only.
    pub fn record_coin_pulse(&self) -> u32 {
        self.pending.record()
    }

    /// Read and clear the pending coin pulses. Control loop only.
    pub fn take_pending_pulses(&self) -> u32 {
        self.pending.drain()
    }

    /// Pending coin pulses, without clearing them.
    pub fn pending_pulses(&self) -> u32 {
        self.pending.peek()
    }

    /// Apply one bill and count the outcome. Bill handler only.
    pub fn credit_bill(&self, amount: u32) -> IncrementOutcome {
        let outcome = self.try_increment(amount);
        let counter = if outcome.is_accepted() {
            &self.bills_credited
        } else {
            &self.bills_rejected
        };
        counter.fetch_add(1, Ordering::AcqRel);
        outcome
    }

    /// Read and clear the handler activity counters. Control loop only.
    pub fn take_activity(&self) -> TenderActivity {
        TenderActivity {
            bills_credited: self.bills_credited.swap(0, Ordering::AcqRel),
            bills_rejected: self.bills_rejected.swap(0, Ordering::AcqRel),
            inhibit_faults: self.inhibit_faults.swap(0, Ordering::AcqRel),
        }
    }

    /// Clear the credit after a completed unlock cycle.
    pub fn reset(&self) {
        self.ledger.reset();
    }

    fn inhibit_on_reject(&self, outcome: IncrementOutcome) {
        if !outcome.is_accepted() && self.gate.disable().is_err() {
            self.inhibit_faults.fetch_add(1, Ordering::AcqRel);
        }
    }
}
