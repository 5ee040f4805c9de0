//! Error types for hardware operations.
//!
//! This module defines error types for the collaborator devices driven by the
//! controller: the door sensor, the lock and buzzer outputs, the acceptor
//! inhibit lines and the character display.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Sampling an input line failed.
    #[error("Read failed on {device}: {message}")]
    ReadFailed { device: String, message: String },

    /// Driving an output line failed.
    #[error("Write failed on {device}: {message}")]
    WriteFailed { device: String, message: String },

    /// Invalid data handed to a device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new read failure.
    pub fn read_failed(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReadFailed {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Create a new write failure.
    pub fn write_failed(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WriteFailed {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
