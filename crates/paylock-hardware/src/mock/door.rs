//! Mock reed switch for testing and development.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::{HardwareError, Result, traits::DoorSensor};

#[derive(Debug)]
struct DoorInner {
    /// Position reported once the script is exhausted.
    closed: AtomicBool,

    /// Readings returned first, in order.
    script: Mutex<VecDeque<bool>>,

    /// Number of upcoming reads that fail.
    failing_reads: AtomicUsize,

    /// Total number of reads, failed ones included.
    reads: AtomicUsize,
}

/// Mock door sensor.
///
/// The sensor reports the readings queued with
/// [`MockDoorHandle::script_readings`] first, then the steady position set
/// with [`MockDoorHandle::set_closed`]. It starts closed.
///
/// # Examples
///
/// ```
/// use paylock_hardware::mock::MockDoorSensor;
/// use paylock_hardware::traits::DoorSensor;
///
/// let (sensor, handle) = MockDoorSensor::new();
/// handle.script_readings([false, false]);
///
/// assert!(!sensor.read_door_closed().unwrap());
/// assert!(!sensor.read_door_closed().unwrap());
/// assert!(sensor.read_door_closed().unwrap());
/// assert_eq!(handle.reads(), 3);
/// ```
#[derive(Debug)]
pub struct MockDoorSensor {
    inner: Arc<DoorInner>,
}

impl MockDoorSensor {
    /// Create a closed door sensor and its control handle.
    pub fn new() -> (Self, MockDoorHandle) {
        let inner = Arc::new(DoorInner {
            closed: AtomicBool::new(true),
            script: Mutex::new(VecDeque::new()),
            failing_reads: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
        });

        let sensor = Self {
            inner: Arc::clone(&inner),
        };
        (sensor, MockDoorHandle { inner })
    }
}

impl DoorSensor for MockDoorSensor {
    fn read_door_closed(&self) -> Result<bool> {
        self.inner.reads.fetch_add(1, Ordering::AcqRel);

        let failing = self
            .inner
            .failing_reads
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(HardwareError::read_failed("mock reed switch", "injected fault"));
        }

        let scripted = self
            .inner
            .script
            .lock()
            .map_err(|_| HardwareError::other("door script lock poisoned"))?
            .pop_front();

        Ok(scripted.unwrap_or_else(|| self.inner.closed.load(Ordering::Acquire)))
    }
}

/// Handle for controlling a mock door sensor.
#[derive(Debug, Clone)]
pub struct MockDoorHandle {
    inner: Arc<DoorInner>,
}

impl MockDoorHandle {
    /// Set the steady door position.
    pub fn set_closed(&self, closed: bool) {
        self.inner.closed.store(closed, Ordering::Release);
    }

    /// Queue readings returned before the steady position.
    pub fn script_readings(&self, readings: impl IntoIterator<Item = bool>) {
        if let Ok(mut script) = self.inner.script.lock() {
            script.extend(readings);
        }
    }

    /// Make the next `count` reads fail.
    pub fn fail_next_reads(&self, count: usize) {
        self.inner.failing_reads.store(count, Ordering::Release);
    }

    /// Total number of reads so far.
    pub fn reads(&self) -> usize {
        self.inner.reads.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_closed() {
        let (sensor, _handle) = MockDoorSensor::new();
        assert!(sensor.read_door_closed().unwrap());
    }

    #[test]
    fn test_steady_position() {
        let (sensor, handle) = MockDoorSensor::new();
        handle.set_closed(false);
        for _ in 0..3 {
            assert!(!sensor.read_door_closed().unwrap());
        }
        assert_eq!(handle.reads(), 3);
    }

    #[test]
    fn test_script_then_steady() {
        let (sensor, handle) = MockDoorSensor::new();
        handle.set_closed(false);
        handle.script_readings([true]);
        assert!(sensor.read_door_closed().unwrap());
        assert!(!sensor.read_door_closed().unwrap());
    }

    #[test]
    fn test_injected_read_faults() {
        let (sensor, handle) = MockDoorSensor::new();
        handle.fail_next_reads(2);
        assert!(sensor.read_door_closed().is_err());
        assert!(sensor.read_door_closed().is_err());
        assert!(sensor.read_door_closed().unwrap());
        assert_eq!(handle.reads(), 3);
    }
}
