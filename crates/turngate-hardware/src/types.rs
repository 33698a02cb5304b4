//! Common types shared across pin implementations.

use serde::{Deserialize, Serialize};

/// Generic device information.
///
/// Contains metadata about an output pin backend, logged when the relay
/// controller acquires it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "gpio17", "Mock Pin").
    pub name: String,

    /// Backend identifier (e.g., "sysfs", "mock").
    pub model: String,

    /// Optional line number on the GPIO controller.
    pub line: Option<u32>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            line: None,
        }
    }

    /// Set the GPIO line number.
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} ({}, line {})", self.name, self.model, line),
            None => write!(f, "{} ({})", self.name, self.model),
        }
    }
}
