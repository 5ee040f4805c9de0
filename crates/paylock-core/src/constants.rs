//! Core constants for the PayLock credit controller.
//!
//! This module defines the pricing, timing and display constants shared by
//! every crate in the workspace. Pricing values are fixed: the controller does
//! not support runtime-configurable prices. Timing values are the defaults of
//! `ControllerConfig` in the controller crate.
//!
//! # Credit Units
//!
//! Credit is counted in the smallest currency increment. One coin pulse is
//! worth [`COIN_PULSE_VALUE`] units and one accepted bill is worth
//! [`BILL_INCREMENT`] units. An unlock cycle starts once the accumulated
//! credit reaches [`THRESHOLD`].
//!
//! ```
//! use paylock_core::constants::*;
//!
//! // Five bills exactly reach the threshold.
//! assert_eq!(BILL_INCREMENT * 5, THRESHOLD);
//!
//! // A bill on top of 45 units would overshoot and is refused.
//! assert!(45 + BILL_INCREMENT > THRESHOLD);
//! ```

// ============================================================================
// Pricing
// ============================================================================

/// Credit required to start an unlock cycle.
///
/// The ledger never commits a value above this threshold: an increment that
/// would overshoot is rejected as a whole.
///
/// # Value: 50 units
pub const THRESHOLD: u32 = 50;

/// Credit added by one accepted bill.
///
/// Bill acceptors emit a single discrete event per accepted note, so the
/// increment is applied directly from the bill handler.
///
/// # Value: 10 units
pub const BILL_INCREMENT: u32 = 10;

/// Credit added by one coin pulse.
///
/// Coin mechanisms report value as a train of pulses; each pulse is worth one
/// unit and the whole train is applied as a single batched increment.
///
/// # Value: 1 unit
pub const COIN_PULSE_VALUE: u32 = 1;

// ============================================================================
// Timing
// ============================================================================

/// Minimum interval between two accepted transitions on one signal line (ms).
///
/// A transition is accepted only if strictly more than this many
/// milliseconds elapsed since the previous accepted transition.
///
/// # Examples
///
/// ```
/// use paylock_core::constants::DEBOUNCE_INTERVAL_MS;
/// use std::time::Duration;
///
/// let window = Duration::from_millis(DEBOUNCE_INTERVAL_MS);
/// assert_eq!(window.as_millis(), 50);
/// ```
pub const DEBOUNCE_INTERVAL_MS: u64 = 50;

/// Interval between two door-sensor polls while the door is open (ms).
///
/// # Value: 100 ms
pub const DOOR_POLL_INTERVAL_MS: u64 = 100;

/// Pause after the door is confirmed closed, letting the lock seat (ms).
///
/// # Value: 2000 ms
pub const SETTLE_DELAY_MS: u64 = 2000;

/// Pause between two passes of the control loop (ms).
///
/// # Value: 1000 ms
pub const LOOP_INTERVAL_MS: u64 = 1000;

// ============================================================================
// Display Geometry
// ============================================================================

/// Number of lines on the character LCD.
pub const LCD_LINES: usize = 4;

/// Number of characters per LCD line.
pub const LCD_COLUMNS: usize = 20;

// ============================================================================
// Display Messages
// ============================================================================

/// Banner shown once at boot, before the first control loop pass.
pub const MSG_INSERT_COIN: &str = "Insert Coin";

/// First line of the idle credit screen.
pub const MSG_INSERT_CREDIT: &str = "Insert Credit";

/// Label prefix for the credit line, followed by the credit value.
pub const MSG_CREDIT_LABEL: &str = "Credit: ";

/// Shown when the lock opens.
pub const MSG_DOOR_OPEN: &str = "Door Open.";

/// Shown on the second line on every poll while the door is open.
pub const MSG_DOOR_OPEN_BUZZ: &str = "Door Open - Buzz";

/// Shown once the door sensor reports closed.
pub const MSG_DOOR_CLOSED: &str = "Door Closed";

/// Shown on the second line after the lock is closed again.
pub const MSG_DOOR_SECURED: &str = "Door Secured";
