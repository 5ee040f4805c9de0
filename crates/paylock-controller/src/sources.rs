//! Input event sources: the coin and bill acceptor handlers.
//!
//! Both handlers run in an asynchronous, interrupt-like context: they may fire
//! at any time, including while the unlock supervisor holds the control task.
//! They run to completion without blocking, logging or rendering, and touch
//! shared state only through the lock-free [`TenderState`] operations.
//!
//! ```text
//!  coin line ──► CoinSource ──► pending pulses ──► control loop ──► ledger
//!  bill line ──► BillSource ─────────────────────────────────────► ledger
//!                     │ (overshoot)
//!                     └──────────► acceptor gate disabled
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use paylock_core::constants::BILL_INCREMENT;
use paylock_core::{DebounceFilter, IncrementOutcome, SignalLevel, Timestamp};
use paylock_hardware::AcceptorInhibit;

use crate::tender::TenderState;

/// Coin acceptor handler.
///
/// Counts debounced falling-edge pulses into the pending pulse counter. The
/// control loop applies the whole pulse train as one increment.
///
/// # Examples
///
/// ```
/// use paylock_controller::{CoinSource, TenderState};
/// use paylock_core::Timestamp;
/// use paylock_hardware::mock::MockInhibit;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let (inhibit, _lines) = MockInhibit::new();
/// let tender = Arc::new(TenderState::new(inhibit));
/// let coins = CoinSource::new(Arc::clone(&tender), Duration::from_millis(50));
///
/// assert!(coins.on_pulse(Timestamp::from_millis(100)));
/// assert!(!coins.on_pulse(Timestamp::from_millis(120))); // bounce
/// assert!(coins.on_pulse(Timestamp::from_millis(200)));
///
/// assert_eq!(tender.pending_pulses(), 2);
/// assert_eq!(tender.credit(), 0); // not applied until the loop drains
/// ```
#[derive(Debug)]
pub struct CoinSource<I> {
    filter: DebounceFilter,
    tender: Arc<TenderState<I>>,
    accepted: AtomicU64,
    debounced: AtomicU64,
}

impl<I: AcceptorInhibit> CoinSource<I> {
    pub fn new(tender: Arc<TenderState<I>>, debounce_interval: Duration) -> Self {
        Self {
            filter: DebounceFilter::new(debounce_interval),
            tender,
            accepted: AtomicU64::new(0),
            debounced: AtomicU64::new(0),
        }
    }

    /// Handle a falling edge on the coin line stamped `now`.
    ///
    /// Returns `true` if the pulse was counted.
    pub fn on_pulse(&self, now: Timestamp) -> bool {
        if !self.filter.should_accept(now) {
            self.debounced.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        self.tender.record_coin_pulse();
        self.accepted.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Pulses counted since start.
    pub fn accepted_pulses(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Pulses dropped as bounces since start.
    pub fn debounced_pulses(&self) -> u64 {
        self.debounced.load(Ordering::Relaxed)
    }
}

/// Outcome of one bill line transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillEvent {
    /// Inside the debounce window; ignored.
    Debounced,

    /// The line returned to its idle level; no credit.
    Released,

    /// A bill was credited; `total` is the new credit.
    Credited { total: u32 },

    /// The bill would overshoot the threshold; refused and acceptors inhibited.
    Rejected { current: u32 },
}

/// Bill acceptor handler.
///
/// The bill line interrupts on both edges. Every change outside the debounce
/// window moves the window, but only a change that leaves the line at its
/// active level credits a bill. The increment is applied immediately: bill
/// acceptors emit one event per note rather than a pulse train.
///
/// # Examples
///
/// ```
/// use paylock_controller::{BillEvent, BillSource, TenderState};
/// use paylock_core::{SignalLevel, Timestamp};
/// use paylock_hardware::mock::MockInhibit;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let (inhibit, _lines) = MockInhibit::new();
/// let tender = Arc::new(TenderState::new(inhibit));
/// let bills = BillSource::new(Arc::clone(&tender), Duration::from_millis(50));
///
/// assert_eq!(
///     bills.on_edge(Timestamp::from_millis(100), SignalLevel::Low),
///     BillEvent::Credited { total: 10 }
/// );
/// assert_eq!(
///     bills.on_edge(Timestamp::from_millis(300), SignalLevel::High),
///     BillEvent::Released
/// );
/// ```
#[derive(Debug)]
pub struct BillSource<I> {
    filter: DebounceFilter,
    tender: Arc<TenderState<I>>,
}

impl<I: AcceptorInhibit> BillSource<I> {
    pub fn new(tender: Arc<TenderState<I>>, debounce_interval: Duration) -> Self {
        Self {
            filter: DebounceFilter::new(debounce_interval),
            tender,
        }
    }

    /// Handle a change on the bill line stamped `now`, leaving it at `level`.
    pub fn on_edge(&self, now: Timestamp, level: SignalLevel) -> BillEvent {
        if !self.filter.should_accept(now) {
            return BillEvent::Debounced;
        }
        if !level.is_active() {
            return BillEvent::Released;
        }

        match self.tender.credit_bill(BILL_INCREMENT) {
            IncrementOutcome::Accepted { total } => BillEvent::Credited { total },
            IncrementOutcome::Rejected { current, .. } => BillEvent::Rejected { current },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paylock_core::constants::{DEBOUNCE_INTERVAL_MS, THRESHOLD};
    use paylock_hardware::mock::{MockInhibit, MockInhibitHandle};
    use rstest::rstest;
    use std::thread;

    type Tender = Arc<TenderState<MockInhibit>>;

    fn tender() -> (Tender, MockInhibitHandle) {
        let (inhibit, lines) = MockInhibit::new();
        let tender = Arc::new(TenderState::new(inhibit));
        tender.gate().enable().unwrap();
        (tender, lines)
    }

    fn window() -> Duration {
        Duration::from_millis(DEBOUNCE_INTERVAL_MS)
    }

    fn at(millis: u64) -> Timestamp {
        Timestamp::from_millis(millis)
    }

    #[test]
    fn test_coin_pulse_only_counts() {
        let (tender, lines) = tender();
        let coins = CoinSource::new(Arc::clone(&tender), window());

        assert!(coins.on_pulse(at(0)));
        assert_eq!(tender.pending_pulses(), 1);
        assert_eq!(tender.credit(), 0);
        assert_eq!(lines.disable_writes(), 0);
    }

    #[rstest]
    #[case(10, 1)]
    #[case(50, 1)]
    #[case(51, 2)]
    fn test_coin_debounce(#[case] gap: u64, #[case] expected: u32) {
        let (tender, _) = tender();
        let coins = CoinSource::new(Arc::clone(&tender), window());

        coins.on_pulse(at(1_000));
        coins.on_pulse(at(1_000 + gap));

        assert_eq!(tender.pending_pulses(), expected);
        assert_eq!(
            coins.accepted_pulses() + coins.debounced_pulses(),
            2,
            "every pulse is classified"
        );
    }

    #[test]
    fn test_coin_pulses_beyond_threshold_still_count() {
        let (tender, _) = tender();
        let coins = CoinSource::new(Arc::clone(&tender), window());
        for i in 0..55 {
            coins.on_pulse(at(i * 60));
        }
        // Bound checking happens when the loop drains, not in the handler.
        assert_eq!(tender.pending_pulses(), 55);
    }

    #[test]
    fn test_five_bills_reach_threshold() {
        let (tender, _) = tender();
        let bills = BillSource::new(Arc::clone(&tender), window());

        for (i, expected) in [10, 20, 30, 40, 50].into_iter().enumerate() {
            let t = i as u64 * 1_000;
            assert_eq!(
                bills.on_edge(at(t), SignalLevel::Low),
                BillEvent::Credited { total: expected }
            );
            assert_eq!(bills.on_edge(at(t + 200), SignalLevel::High), BillEvent::Released);
        }
        assert!(tender.has_reached_threshold());
        assert_eq!(tender.take_activity().bills_credited, 5);
    }

    #[test]
    fn test_bill_bounce_is_ignored() {
        let (tender, _) = tender();
        let bills = BillSource::new(Arc::clone(&tender), window());

        assert!(matches!(
            bills.on_edge(at(500), SignalLevel::Low),
            BillEvent::Credited { .. }
        ));
        assert_eq!(bills.on_edge(at(520), SignalLevel::High), BillEvent::Debounced);
        assert_eq!(bills.on_edge(at(540), SignalLevel::Low), BillEvent::Debounced);
        assert_eq!(tender.credit(), 10);
    }

    #[test]
    fn test_release_moves_debounce_window() {
        let (tender, _) = tender();
        let bills = BillSource::new(Arc::clone(&tender), window());

        assert_eq!(bills.on_edge(at(100), SignalLevel::High), BillEvent::Released);
        // Active edge 30ms after an accepted release is a bounce.
        assert_eq!(bills.on_edge(at(130), SignalLevel::Low), BillEvent::Debounced);
        assert_eq!(tender.credit(), 0);
    }

    #[test]
    fn test_bill_overshoot_disables_acceptors() {
        let (tender, lines) = tender();
        tender.try_increment(45);
        let bills = BillSource::new(Arc::clone(&tender), window());

        assert_eq!(
            bills.on_edge(at(0), SignalLevel::Low),
            BillEvent::Rejected { current: 45 }
        );
        assert_eq!(tender.credit(), 45);
        assert!(!lines.is_enabled());
    }

    #[test]
    fn test_concurrent_handlers_respect_threshold() {
        let (tender, _) = tender();
        let coins = Arc::new(CoinSource::new(Arc::clone(&tender), window()));
        let bills = Arc::new(BillSource::new(Arc::clone(&tender), window()));

        let coin_thread = {
            let coins = Arc::clone(&coins);
            thread::spawn(move || {
                for i in 0..200 {
                    coins.on_pulse(at(i * 60));
                }
            })
        };
        let bill_thread = {
            let bills = Arc::clone(&bills);
            thread::spawn(move || {
                for i in 0..20 {
                    bills.on_edge(at(i * 120), SignalLevel::Low);
                }
            })
        };

        // Control loop draining concurrently.
        for _ in 0..50 {
            let pulses = tender.take_pending_pulses();
            if pulses > 0 {
                tender.drain_pending_coins(pulses);
            }
            assert!(tender.credit() <= THRESHOLD);
            thread::yield_now();
        }

        coin_thread.join().unwrap();
        bill_thread.join().unwrap();
        assert!(tender.credit() <= THRESHOLD);
        assert_eq!(coins.accepted_pulses(), 200);
    }
}
