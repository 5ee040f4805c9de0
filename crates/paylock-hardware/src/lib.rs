//! Hardware device abstraction layer for the PayLock credit controller.
//!
//! This crate provides trait-based abstractions for the peripherals driven by
//! the controller: the reed switch on the door, the solenoid lock, the buzzer,
//! the inhibit lines of the coin and bill acceptors and the character display.
//! It also abstracts time, so the control loop and the unlock supervisor can
//! run against a deterministic clock in tests.
//!
//! # Design Philosophy
//!
//! - **One trait per device**: mocks and real drivers can be swapped one
//!   device at a time.
//! - **Synchronous device I/O**: sensor reads and actuator writes complete
//!   before returning; only [`Sleeper`] is `async`.
//! - **Thread-safe**: all traits require `Send + Sync`. [`AcceptorInhibit`]
//!   takes `&self` because hardware handlers call it concurrently with the
//!   control task.
//! - **Error-aware**: all operations return [`Result<T>`][error::Result].
//!
//! # Example
//!
//! ```
//! use paylock_hardware::mock::{MockBuzzer, MockDoorSensor};
//! use paylock_hardware::traits::{Buzzer, DoorSensor};
//!
//! let (sensor, door) = MockDoorSensor::new();
//! let (mut buzzer, alarm) = MockBuzzer::new();
//!
//! door.set_closed(false);
//! if !sensor.read_door_closed().unwrap() {
//!     buzzer.set_buzzer(true).unwrap();
//! }
//! assert!(alarm.is_on());
//! ```
//!
//! [`Sleeper`]: traits::Sleeper
//! [`AcceptorInhibit`]: traits::AcceptorInhibit

pub mod clock;
pub mod error;
pub mod mock;
pub mod traits;

// Re-export commonly used types for convenience
pub use clock::{SystemClock, TokioSleeper};
pub use error::{HardwareError, Result};
pub use traits::{
    AcceptorInhibit, Buzzer, Clock, DisplayDevice, DoorSensor, LockActuator, Sleeper,
};
