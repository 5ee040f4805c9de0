//! Acceptor gate: one enable/disable switch for both acceptors.

use std::sync::atomic::{AtomicBool, Ordering};

use paylock_hardware::{AcceptorInhibit, Result};

/// Lockstep enable/disable of the coin and bill acceptors.
///
/// The logical state lives in an atomic so the bill handler and the control
/// task can both drive the gate without a lock. After each physical write the
/// gate re-reads the logical state and writes again if another caller changed
/// it in between, so the outputs always converge to the last logical write.
///
/// The gate starts disabled; the first control loop pass enables it.
///
/// # Examples
///
/// ```
/// use paylock_controller::AcceptorGate;
/// use paylock_hardware::mock::MockInhibit;
///
/// let (inhibit, lines) = MockInhibit::new();
/// let gate = AcceptorGate::new(inhibit);
///
/// gate.enable().unwrap();
/// assert!(gate.is_enabled());
/// assert!(lines.is_enabled());
///
/// gate.disable().unwrap();
/// assert!(!lines.is_enabled());
/// ```
#[derive(Debug)]
pub struct AcceptorGate<I> {
    inhibit: I,
    enabled: AtomicBool,
}

impl<I: AcceptorInhibit> AcceptorGate<I> {
    pub fn new(inhibit: I) -> Self {
        Self {
            inhibit,
            enabled: AtomicBool::new(false),
        }
    }

    /// Enable both acceptors. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the inhibit lines cannot be driven.
    pub fn enable(&self) -> Result<()> {
        self.set(true)
    }

    /// Inhibit both acceptors. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the inhibit lines cannot be driven.
    pub fn disable(&self) -> Result<()> {
        self.set(false)
    }

    /// Last logical state written.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set(&self, enabled: bool) -> Result<()> {
        self.enabled.store(enabled, Ordering::SeqCst);

        let mut written = enabled;
        loop {
            self.inhibit.set_acceptors_enabled(written)?;

            let current = self.enabled.load(Ordering::SeqCst);
            if current == written {
                return Ok(());
            }
            written = current;
        }
    }
}
