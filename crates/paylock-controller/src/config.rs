//! Controller timing configuration.
//!
//! Pricing is fixed in [`paylock_core::constants`]; only timing values can be
//! overridden, which the simulator uses to run faster than the real machine.
//!
//! # Examples
//!
//! ```
//! use paylock_controller::ControllerConfig;
//! use std::time::Duration;
//!
//! let config = ControllerConfig::default().with_loop_interval_ms(250);
//! assert_eq!(config.loop_interval(), Duration::from_millis(250));
//! assert_eq!(config.settle_delay(), Duration::from_millis(2000));
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use paylock_core::constants::{
    DEBOUNCE_INTERVAL_MS, DOOR_POLL_INTERVAL_MS, LOOP_INTERVAL_MS, SETTLE_DELAY_MS,
};
use paylock_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Timing values for the control loop, the unlock supervisor and the
/// debounce filters.
///
/// Missing fields take their default when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Debounce window of both signal lines (ms).
    pub debounce_interval_ms: u64,

    /// Door sensor poll interval while the door is open (ms).
    pub door_poll_interval_ms: u64,

    /// Pause after the door closes (ms).
    pub settle_delay_ms: u64,

    /// Pause between two control loop passes (ms).
    pub loop_interval_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce_interval_ms: DEBOUNCE_INTERVAL_MS,
            door_poll_interval_ms: DOOR_POLL_INTERVAL_MS,
            settle_delay_ms: SETTLE_DELAY_MS,
            loop_interval_ms: LOOP_INTERVAL_MS,
        }
    }
}

impl ControllerConfig {
    pub fn with_debounce_interval_ms(mut self, millis: u64) -> Self {
        self.debounce_interval_ms = millis;
        self
    }

    pub fn with_door_poll_interval_ms(mut self, millis: u64) -> Self {
        self.door_poll_interval_ms = millis;
        self
    }

    pub fn with_settle_delay_ms(mut self, millis: u64) -> Self {
        self.settle_delay_ms = millis;
        self
    }

    pub fn with_loop_interval_ms(mut self, millis: u64) -> Self {
        self.loop_interval_ms = millis;
        self
    }

    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_interval_ms)
    }

    pub fn door_poll_interval(&self) -> Duration {
        Duration::from_millis(self.door_poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn loop_interval(&self) -> Duration {
        Duration::from_millis(self.loop_interval_ms)
    }

    /// Check that the configuration cannot produce a busy loop.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the door poll interval or the loop
    /// interval is zero.
    pub fn validate(&self) -> Result<()> {
        if self.door_poll_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "door poll interval must be non-zero".to_string(),
            ));
        }
        if self.loop_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "loop interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
