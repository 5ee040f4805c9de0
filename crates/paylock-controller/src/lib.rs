//! PayLock credit controller.
//!
//! This crate ties the pieces together: the coin and bill sources feed a
//! shared [`TenderState`], the [`Controller`] drains it once per pass and
//! hands over to the [`UnlockSupervisor`] when the credit threshold is met.

pub mod config;
pub mod control_loop;
pub mod display;
pub mod error;
pub mod gate;
pub mod sources;
pub mod state_machine;
pub mod supervisor;
pub mod tender;

pub use config::ControllerConfig;
pub use control_loop::{Controller, StepReport};
pub use display::{LcdHandle, VirtualLcd};
pub use error::{ControllerError, ControllerResult};
pub use gate::AcceptorGate;
pub use sources::{BillEvent, BillSource, CoinSource};
pub use state_machine::{UnlockState, UnlockStateMachine, UnlockTransition};
pub use supervisor::{Peripherals, UnlockReport, UnlockSupervisor};
pub use tender::{TenderActivity, TenderState};
