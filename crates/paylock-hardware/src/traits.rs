//! Hardware device trait definitions.
//!
//! This module defines the contract between the controller core and the
//! peripherals it drives. Each physical collaborator gets its own trait so
//! mocks and real drivers can be swapped one device at a time.
//!
//! Device operations are synchronous: a sensor read returns promptly and an
//! actuator write takes effect before the call returns. Only [`Sleeper`] is
//! asynchronous, using native `async fn` in traits (Rust 1.90 + Edition 2024
//! RPITIT).

#![allow(async_fn_in_trait)]

use std::sync::Arc;
use std::time::Duration;

use paylock_core::Timestamp;

use crate::error::Result;

/// Reed switch reporting the door position.
///
/// # Examples
///
/// ```
/// use paylock_hardware::mock::MockDoorSensor;
/// use paylock_hardware::traits::DoorSensor;
///
/// let (sensor, handle) = MockDoorSensor::new();
/// assert!(sensor.read_door_closed().unwrap());
///
/// handle.set_closed(false);
/// assert!(!sensor.read_door_closed().unwrap());
/// ```
pub trait DoorSensor: Send + Sync {
    /// Sample the door position. Returns `true` when the door is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor cannot be sampled.
    fn read_door_closed(&self) -> Result<bool>;
}

/// Solenoid lock output.
pub trait LockActuator: Send + Sync {
    /// Drive the solenoid. `true` releases the lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be driven.
    fn set_lock(&mut self, open: bool) -> Result<()>;
}

/// Audible alert output.
pub trait Buzzer: Send + Sync {
    /// Switch the buzzer on or off.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be driven.
    fn set_buzzer(&mut self, on: bool) -> Result<()>;
}

/// Inhibit lines of the coin and bill acceptors.
///
/// A single call drives both lines to the same state, so the two acceptors
/// are never split between enabled and disabled. The method takes `&self`
/// because the bill handler disables the acceptors from its own context.
pub trait AcceptorInhibit: Send + Sync {
    /// Enable (`true`) or inhibit (`false`) both acceptors.
    ///
    /// # Errors
    ///
    /// Returns an error if either line cannot be driven.
    fn set_acceptors_enabled(&self, enabled: bool) -> Result<()>;
}

impl<T: AcceptorInhibit + ?Sized> AcceptorInhibit for Arc<T> {
    fn set_acceptors_enabled(&self, enabled: bool) -> Result<()> {
        (**self).set_acceptors_enabled(enabled)
    }
}

/// Character display.
pub trait DisplayDevice: Send + Sync {
    /// Write `text` on `line` (0-based), replacing its previous content.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is out of range or the text cannot be
    /// shown on the device.
    fn show(&mut self, line: usize, text: &str) -> Result<()>;

    /// Blank every line.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be written.
    fn clear(&mut self) -> Result<()>;
}

/// Monotonic millisecond clock used to stamp signal transitions.
pub trait Clock: Send + Sync {
    /// Time since the clock started.
    fn now(&self) -> Timestamp;
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Delay capability for the control task.
///
/// Injected so tests can replace real delays with recorded, instant ones.
pub trait Sleeper: Send + Sync {
    /// Suspend the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}
