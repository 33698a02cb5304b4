//! Error types for hardware operations.
//!
//! This module defines error types specific to digital output pins and the
//! relay controller built on top of them, covering pin acquisition failures,
//! failed level writes and misuse of the relay state machine.

use turngate_core::Level;

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The requested GPIO line does not exist on this host.
    #[error("Pin not found: {pin}")]
    PinNotFound { pin: String },

    /// The GPIO line is already owned by another consumer.
    #[error("Pin already in use: {pin}")]
    PinBusy { pin: String },

    /// Operation requires an initialized pin.
    #[error("Pin not initialized")]
    NotInitialized,

    /// The pin was initialized twice without a release in between.
    #[error("Pin already initialized")]
    AlreadyInitialized,

    /// Driving the pin to a level failed.
    #[error("Failed to set pin {level}: {message}")]
    Write { level: Level, message: String },

    /// Device configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl HardwareError {
    /// Create a new pin-not-found error.
    pub fn pin_not_found(pin: impl Into<String>) -> Self {
        Self::PinNotFound { pin: pin.into() }
    }

    /// Create a new pin-busy error.
    pub fn pin_busy(pin: impl Into<String>) -> Self {
        Self::PinBusy { pin: pin.into() }
    }

    /// Create a new write error.
    pub fn write(level: Level, message: impl Into<String>) -> Self {
        Self::Write {
            level,
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Returns `true` if the error means the pin could not be acquired.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(self, Self::PinNotFound { .. } | Self::PinBusy { .. })
    }
}

impl From<turngate_core::Error> for HardwareError {
    fn from(error: turngate_core::Error) -> Self {
        Self::configuration(error.to_string())
    }
}
