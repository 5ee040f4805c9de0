//! Unlock supervisor: releases the lock once the credit threshold is met and
//! keeps the control task until the door is closed again.
//!
//! # Sequence
//!
//! ```text
//!  Idle ──► Unlocking ──(door closed)──► Securing ──(settle delay)──► Idle
//!              │  ▲
//!              └──┘ door open: buzzer on, wait one poll interval
//! ```
//!
//! There is no timeout. A door that never reports closed keeps the buzzer
//! sounding until someone closes it. A sensor that cannot be read is treated
//! the same way as an open door.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use paylock_core::DoorState;
use paylock_core::constants::{
    MSG_DOOR_CLOSED, MSG_DOOR_OPEN, MSG_DOOR_OPEN_BUZZ, MSG_DOOR_SECURED,
};
use paylock_hardware::{Buzzer, DisplayDevice, DoorSensor, LockActuator, Sleeper};
use tracing::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::error::ControllerResult;
use crate::state_machine::{UnlockState, UnlockStateMachine, UnlockTransition};

/// The devices driven during an unlock cycle.
///
/// Owned by the control task; handlers never touch them.
#[derive(Debug)]
pub struct Peripherals<D, L, B, Y> {
    pub door: D,
    pub lock: L,
    pub buzzer: B,
    pub display: Y,
}

impl<D, L, B, Y> Peripherals<D, L, B, Y> {
    pub fn new(door: D, lock: L, buzzer: B, display: Y) -> Self {
        Self {
            door,
            lock,
            buzzer,
            display,
        }
    }
}

/// What happened during one unlock cycle.
#[derive(Debug, Clone)]
pub struct UnlockReport {
    /// Polls that found the door open.
    pub open_polls: u32,

    /// Polls where the sensor could not be read.
    pub sensor_faults: u32,

    /// Transitions walked, oldest first.
    pub transitions: Vec<UnlockTransition>,
}

impl fmt::Display for UnlockReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} open polls, {} sensor faults",
            self.open_polls, self.sensor_faults
        )
    }
}

/// Runs unlock cycles and tracks their phase.
#[derive(Debug)]
pub struct UnlockSupervisor {
    machine: UnlockStateMachine,
    poll_interval: Duration,
    settle_delay: Duration,
}

impl UnlockSupervisor {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            machine: UnlockStateMachine::new(),
            poll_interval: config.door_poll_interval(),
            settle_delay: config.settle_delay(),
        }
    }

    /// Current phase.
    pub fn state(&self) -> UnlockState {
        self.machine.current_state()
    }

    /// Recent transitions across cycles, oldest first.
    pub fn history(&self) -> &VecDeque<UnlockTransition> {
        self.machine.history()
    }

    /// Force the supervisor back to `Idle` after an aborted cycle.
    pub fn reset(&mut self) {
        if let Some(transition) = self.machine.reset() {
            warn!(from = %transition.from, "Unlock cycle aborted, supervisor reset");
        }
    }

    /// Run one unlock cycle to completion.
    ///
    /// Releases the lock, waits for the door to be opened and closed again,
    /// re-engages the lock and waits out the settle delay. Device faults are
    /// logged and do not abort the cycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the supervisor is not `Idle` when called, which
    /// means a previous cycle was aborted without [`reset`](Self::reset).
    pub async fn run<D, L, B, Y, S>(
        &mut self,
        hw: &mut Peripherals<D, L, B, Y>,
        sleeper: &S,
    ) -> ControllerResult<UnlockReport>
    where
        D: DoorSensor,
        L: LockActuator,
        B: Buzzer,
        Y: DisplayDevice,
        S: Sleeper,
    {
        let mut transitions = Vec::with_capacity(3);
        let mut open_polls = 0u32;
        let mut sensor_faults = 0u32;

        transitions.push(self.machine.transition_to(UnlockState::Unlocking)?);

        best_effort("display", hw.display.clear());
        best_effort("display", hw.display.show(0, MSG_DOOR_OPEN));
        info!("{}", MSG_DOOR_OPEN);
        best_effort("solenoid", hw.lock.set_lock(true));

        loop {
            let door = match hw.door.read_door_closed() {
                Ok(closed) => DoorState::from_closed(closed),
                Err(e) => {
                    sensor_faults += 1;
                    warn!(error = %e, "Door sensor read failed, treating door as open");
                    DoorState::Open
                }
            };
            if door.is_closed() {
                break;
            }

            open_polls += 1;
            best_effort("buzzer", hw.buzzer.set_buzzer(true));
            best_effort("display", hw.display.show(1, MSG_DOOR_OPEN_BUZZ));
            debug!(open_polls, "Door still open");
            sleeper.sleep(self.poll_interval).await;
        }

        transitions.push(self.machine.transition_to(UnlockState::Securing)?);

        best_effort("buzzer", hw.buzzer.set_buzzer(false));
        best_effort("display", hw.display.clear());
        best_effort("display", hw.display.show(0, MSG_DOOR_CLOSED));
        info!("{}", MSG_DOOR_CLOSED);
        best_effort("solenoid", hw.lock.set_lock(false));
        best_effort("display", hw.display.show(1, MSG_DOOR_SECURED));

        sleeper.sleep(self.settle_delay).await;

        transitions.push(self.machine.transition_to(UnlockState::Idle)?);

        let report = UnlockReport {
            open_polls,
            sensor_faults,
            transitions,
        };
        info!(%report, "Unlock cycle complete");
        Ok(report)
    }
}

/// Log a failed device write and carry on.
pub(crate) fn best_effort(device: &str, result: paylock_hardware::Result<()>) {
    if let Err(e) = result {
        warn!(device, error = %e, "Device write failed");
    }
}
