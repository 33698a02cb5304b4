//! Enum wrapper for output pin dispatch.
//!
//! Native `async fn` in traits (RPITIT, Edition 2024) is not object-safe, so
//! `Box<dyn DigitalOutputPin>` is not available. [`AnyOutputPin`] gives the
//! relay controller one concrete type over every backend instead, which also
//! keeps its futures `Send` so pulses can run on a spawned task.
//!
//! # Examples
//!
//! ```
//! use turngate_hardware::devices::AnyOutputPin;
//! use turngate_hardware::mock::MockPin;
//!
//! let (pin, _handle) = MockPin::new();
//! let any_pin = AnyOutputPin::Mock(pin);
//!
//! // Can now be used polymorphically through the DigitalOutputPin trait
//! ```

use crate::mock::MockPin;
use crate::sysfs::SysfsPin;
use crate::traits::DigitalOutputPin;
use crate::{DeviceInfo, HardwareError, Result};
use turngate_core::{Level, PinId};

/// Enum wrapper for output pin dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyOutputPin {
    /// Mock pin for development and testing.
    Mock(MockPin),

    /// Linux sysfs GPIO line.
    Sysfs(SysfsPin),
}

impl AnyOutputPin {
    /// Open the configured relay line through sysfs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the identifier does not name a GPIO
    /// line. The line itself is not touched until `initialize`.
    pub fn sysfs(pin: &PinId) -> Result<Self> {
        let line = pin.line().map_err(HardwareError::from)?;
        Ok(Self::Sysfs(SysfsPin::new(line)))
    }
}

impl From<MockPin> for AnyOutputPin {
    fn from(pin: MockPin) -> Self {
        Self::Mock(pin)
    }
}

impl From<SysfsPin> for AnyOutputPin {
    fn from(pin: SysfsPin) -> Self {
        Self::Sysfs(pin)
    }
}

impl DigitalOutputPin for AnyOutputPin {
    async fn initialize(&mut self, level: Level) -> Result<()> {
        match self {
            Self::Mock(pin) => pin.initialize(level).await,
            Self::Sysfs(pin) => pin.initialize(level).await,
        }
    }

    async fn set_level(&mut self, level: Level) -> Result<()> {
        match self {
            Self::Mock(pin) => pin.set_level(level).await,
            Self::Sysfs(pin) => pin.set_level(level).await,
        }
    }

    async fn release(&mut self) -> Result<()> {
        match self {
            Self::Mock(pin) => pin.release().await,
            Self::Sysfs(pin) => pin.release().await,
        }
    }

    fn info(&self) -> DeviceInfo {
        match self {
            Self::Mock(pin) => pin.info(),
            Self::Sysfs(pin) => pin.info(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_any_pin_dispatches_to_mock() {
        let (pin, handle) = MockPin::new();
        let mut pin = AnyOutputPin::from(pin);

        pin.initialize(Level::Low).await.unwrap();
        pin.set_level(Level::High).await.unwrap();
        pin.release().await.unwrap();

        assert_eq!(handle.levels(), vec![Level::Low, Level::High]);
        assert_eq!(handle.release_count(), 1);
        assert_eq!(pin.info().model, "mock");
    }

    #[test]
    fn test_any_pin_sysfs_resolves_header_name() {
        let pin = AnyOutputPin::sysfs(&PinId::Name("P1_11".to_string())).unwrap();
        assert_eq!(pin.info().line, Some(17));
    }

    #[test]
    fn test_any_pin_sysfs_rejects_unknown_name() {
        let result = AnyOutputPin::sysfs(&PinId::Name("relay".to_string()));
        assert!(matches!(
            result,
            Err(HardwareError::ConfigurationError { .. })
        ));
    }
}
