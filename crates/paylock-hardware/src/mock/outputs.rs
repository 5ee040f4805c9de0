//! Mock output devices: solenoid lock, buzzer and acceptor inhibit lines.
//!
//! Every mock logs its writes at debug level and keeps a record that tests
//! read through the matching handle.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::{
    HardwareError, Result,
    traits::{AcceptorInhibit, Buzzer, LockActuator},
};

#[derive(Debug)]
struct OutputInner {
    /// Device name used in logs and errors.
    name: &'static str,

    /// Last value written.
    state: AtomicBool,

    /// Every value written, oldest first.
    history: Mutex<Vec<bool>>,

    /// When set, writes fail without changing the output.
    fail_writes: AtomicBool,
}

impl OutputInner {
    fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            state: AtomicBool::new(false),
            history: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        })
    }

    fn write(&self, on: bool) -> Result<()> {
        if self.fail_writes.load(Ordering::Acquire) {
            return Err(HardwareError::write_failed(self.name, "injected fault"));
        }

        self.state.store(on, Ordering::Release);
        self.history
            .lock()
            .map_err(|_| HardwareError::other("output history lock poisoned"))?
            .push(on);
        debug!(device = self.name, on, "output write");
        Ok(())
    }
}

/// Mock solenoid lock. Starts closed.
///
/// # Examples
///
/// ```
/// use paylock_hardware::mock::MockLock;
/// use paylock_hardware::traits::LockActuator;
///
/// let (mut lock, handle) = MockLock::new();
/// lock.set_lock(true).unwrap();
/// lock.set_lock(false).unwrap();
///
/// assert!(!handle.is_on());
/// assert_eq!(handle.history(), vec![true, false]);
/// ```
#[derive(Debug)]
pub struct MockLock {
    inner: Arc<OutputInner>,
}

impl MockLock {
    pub fn new() -> (Self, MockOutputHandle) {
        let inner = OutputInner::new("solenoid");
        (
            Self {
                inner: Arc::clone(&inner),
            },
            MockOutputHandle { inner },
        )
    }
}

impl LockActuator for MockLock {
    fn set_lock(&mut self, open: bool) -> Result<()> {
        self.inner.write(open)
    }
}

/// Mock buzzer. Starts silent.
#[derive(Debug)]
pub struct MockBuzzer {
    inner: Arc<OutputInner>,
}

impl MockBuzzer {
    pub fn new() -> (Self, MockOutputHandle) {
        let inner = OutputInner::new("buzzer");
        (
            Self {
                inner: Arc::clone(&inner),
            },
            MockOutputHandle { inner },
        )
    }
}

impl Buzzer for MockBuzzer {
    fn set_buzzer(&mut self, on: bool) -> Result<()> {
        self.inner.write(on)
    }
}

/// Handle for inspecting a mock lock or buzzer.
#[derive(Debug, Clone)]
pub struct MockOutputHandle {
    inner: Arc<OutputInner>,
}

impl MockOutputHandle {
    /// Last value written.
    pub fn is_on(&self) -> bool {
        self.inner.state.load(Ordering::Acquire)
    }

    /// Every value written, oldest first.
    pub fn history(&self) -> Vec<bool> {
        self.inner
            .history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    /// Number of writes of `value`.
    pub fn writes_of(&self, value: bool) -> usize {
        self.history().into_iter().filter(|&v| v == value).count()
    }

    /// Make subsequent writes fail (`true`) or succeed again (`false`).
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::Release);
    }
}

#[derive(Debug)]
struct InhibitInner {
    enabled: AtomicBool,
    enable_writes: AtomicUsize,
    disable_writes: AtomicUsize,
}

/// Mock acceptor inhibit lines.
///
/// Lock-free, since the bill handler writes it from handler context. Both
/// acceptor lines are modelled by one flag: the trait never lets them differ.
/// Starts inhibited.
#[derive(Debug)]
pub struct MockInhibit {
    inner: Arc<InhibitInner>,
}

impl MockInhibit {
    pub fn new() -> (Self, MockInhibitHandle) {
        let inner = Arc::new(InhibitInner {
            enabled: AtomicBool::new(false),
            enable_writes: AtomicUsize::new(0),
            disable_writes: AtomicUsize::new(0),
        });
        (
            Self {
                inner: Arc::clone(&inner),
            },
            MockInhibitHandle { inner },
        )
    }
}

impl AcceptorInhibit for MockInhibit {
    fn set_acceptors_enabled(&self, enabled: bool) -> Result<()> {
        self.inner.enabled.store(enabled, Ordering::Release);
        let counter = if enabled {
            &self.inner.enable_writes
        } else {
            &self.inner.disable_writes
        };
        counter.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

/// Handle for inspecting mock inhibit lines.
#[derive(Debug, Clone)]
pub struct MockInhibitHandle {
    inner: Arc<InhibitInner>,
}

impl MockInhibitHandle {
    /// Whether both acceptors are currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    /// Number of enable writes.
    pub fn enable_writes(&self) -> usize {
        self.inner.enable_writes.load(Ordering::Acquire)
    }

    /// Number of disable writes.
    pub fn disable_writes(&self) -> usize {
        self.inner.disable_writes.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_records_writes() {
        let (mut lock, handle) = MockLock::new();
        assert!(!handle.is_on());
        lock.set_lock(true).unwrap();
        assert!(handle.is_on());
        lock.set_lock(false).unwrap();
        assert_eq!(handle.history(), vec![true, false]);
    }

    #[test]
    fn test_buzzer_counts_writes() {
        let (mut buzzer, handle) = MockBuzzer::new();
        for _ in 0..3 {
            buzzer.set_buzzer(true).unwrap();
        }
        buzzer.set_buzzer(false).unwrap();
        assert_eq!(handle.writes_of(true), 3);
        assert_eq!(handle.writes_of(false), 1);
        assert!(!handle.is_on());
    }

    #[test]
    fn test_failed_write_leaves_output_unchanged() {
        let (mut lock, handle) = MockLock::new();
        handle.set_fail_writes(true);
        assert!(matches!(
            lock.set_lock(true),
            Err(HardwareError::WriteFailed { .. })
        ));
        assert!(!handle.is_on());
        assert!(handle.history().is_empty());

        handle.set_fail_writes(false);
        lock.set_lock(true).unwrap();
        assert!(handle.is_on());
    }

    #[test]
    fn test_inhibit_starts_disabled() {
        let (inhibit, handle) = MockInhibit::new();
        assert!(!handle.is_enabled());
        inhibit.set_acceptors_enabled(true).unwrap();
        inhibit.set_acceptors_enabled(true).unwrap();
        inhibit.set_acceptors_enabled(false).unwrap();
        assert!(!handle.is_enabled());
        assert_eq!(handle.enable_writes(), 2);
        assert_eq!(handle.disable_writes(), 1);
    }

    #[test]
    fn test_inhibit_through_arc() {
        let (inhibit, handle) = MockInhibit::new();
        let shared = Arc::new(inhibit);
        shared.set_acceptors_enabled(true).unwrap();
        assert!(handle.is_enabled());
    }
}
