use thiserror::Error;

/// Errors raised by the controller.
///
/// Credit rejections and debounce misses are not errors: they are reported as
/// outcomes. Device faults are logged where they happen. What remains are
/// broken invariants and setup problems.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// State machine or configuration error from the core crate
    #[error(transparent)]
    Core(#[from] paylock_core::Error),
}

/// Specialized result type for controller operations
pub type ControllerResult<T> = Result<T, ControllerError>;
