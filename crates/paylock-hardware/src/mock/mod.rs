//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled and
//! inspected programmatically without physical hardware. Each mock is created
//! together with a handle sharing its state, so a test can keep the handle
//! after moving the device into the controller.

pub mod clock;
pub mod door;
pub mod outputs;

// Re-export commonly used types
pub use clock::{MockClock, RecordingSleeper};
pub use door::{MockDoorHandle, MockDoorSensor};
pub use outputs::{MockBuzzer, MockInhibit, MockInhibitHandle, MockLock, MockOutputHandle};
