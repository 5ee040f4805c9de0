pub mod constants;
pub mod debounce;
pub mod error;
pub mod ledger;
pub mod types;

pub use debounce::DebounceFilter;
pub use error::{Error, Result};
pub use ledger::{CreditLedger, IncrementOutcome, PendingPulses};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
