//! Unlock cycle state machine.
//!
//! The unlock supervisor walks this machine once per cycle. Tracking the
//! phase explicitly lets the control loop recover from a cycle that was
//! aborted halfway, and gives the simulator something to report.
//!
//! # States
//!
//! - `Idle`: accepting credit
//! - `Unlocking`: lock released, waiting for the door to close
//! - `Securing`: door closed, lock re-engaged, settling
//!
//! # Valid Transitions
//!
//! - Idle → Unlocking → Securing → Idle
//!
//! # Examples
//!
//! ```
//! use paylock_controller::{UnlockState, UnlockStateMachine};
//!
//! let mut machine = UnlockStateMachine::new();
//! assert_eq!(machine.current_state(), UnlockState::Idle);
//!
//! machine.transition_to(UnlockState::Unlocking).unwrap();
//! assert!(machine.transition_to(UnlockState::Idle).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use paylock_core::{Error, Result};

/// Maximum number of transitions kept in history.
///
/// One unlock cycle records three transitions, so this covers the last
/// thirty-odd cycles.
const MAX_HISTORY_SIZE: usize = 100;

/// Phase of the unlock cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockState {
    /// Accepting credit; lock engaged.
    Idle,

    /// Lock released; door being watched.
    Unlocking,

    /// Door closed and lock re-engaged; waiting out the settle delay.
    Securing,
}

impl fmt::Display for UnlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            UnlockState::Idle => "Idle",
            UnlockState::Unlocking => "Unlocking",
            UnlockState::Securing => "Securing",
        };
        write!(f, "{}", state_str)
    }
}

impl UnlockState {
    /// Check if a transition to `target` is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use paylock_controller::UnlockState;
    ///
    /// assert!(UnlockState::Idle.can_transition_to(&UnlockState::Unlocking));
    /// assert!(!UnlockState::Idle.can_transition_to(&UnlockState::Securing));
    /// ```
    pub fn can_transition_to(&self, target: &UnlockState) -> bool {
        matches!(
            (self, target),
            (UnlockState::Idle, UnlockState::Unlocking)
                | (UnlockState::Unlocking, UnlockState::Securing)
                | (UnlockState::Securing, UnlockState::Idle)
        )
    }
}

/// A single recorded transition.
///
/// The `timestamp` field is not serialized as `Instant` is process-specific;
/// deserialized records carry the time of deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockTransition {
    pub from: UnlockState,
    pub to: UnlockState,

    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl UnlockTransition {
    pub fn new(from: UnlockState, to: UnlockState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

/// State machine for the unlock cycle.
///
/// Not thread-safe; owned by the unlock supervisor on the control task.
#[derive(Debug)]
pub struct UnlockStateMachine {
    current_state: UnlockState,

    /// Recent transitions, oldest first, at most `MAX_HISTORY_SIZE`.
    history: VecDeque<UnlockTransition>,
}

impl UnlockStateMachine {
    /// Create a machine in the `Idle` state.
    pub fn new() -> Self {
        Self {
            current_state: UnlockState::Idle,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> UnlockState {
        self.current_state
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<UnlockTransition> {
        &self.history
    }

    /// Move to `new_state` if the transition is valid.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if `new_state` cannot follow
    /// the current state. The machine is left unchanged.
    pub fn transition_to(&mut self, new_state: UnlockState) -> Result<UnlockTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = UnlockTransition::new(self.current_state, new_state);
        self.perform_state_change(new_state, transition.clone());
        Ok(transition)
    }

    /// Force the machine back to `Idle`, for recovery after an aborted cycle.
    ///
    /// Returns `None` if the machine was already idle.
    pub fn reset(&mut self) -> Option<UnlockTransition> {
        if self.current_state == UnlockState::Idle {
            return None;
        }
        let transition = UnlockTransition::new(self.current_state, UnlockState::Idle);
        self.perform_state_change(UnlockState::Idle, transition.clone());
        Some(transition)
    }

    fn perform_state_change(&mut self, new_state: UnlockState, transition: UnlockTransition) {
        self.current_state = new_state;

        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for UnlockStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
