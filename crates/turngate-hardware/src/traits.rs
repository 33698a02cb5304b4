//! Hardware device trait definitions.
//!
//! This module defines the single capability the relay controller needs from
//! the platform: a digital output line that can be acquired at a known level,
//! driven High or Low, and handed back. Each GPIO backend implements
//! [`DigitalOutputPin`]; the relay state machine never changes when a new
//! backend is added.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::DeviceInfo;
use turngate_core::Level;

/// Digital output pin abstraction.
///
/// A pin has three lifecycle operations:
///
/// 1. [`initialize`](Self::initialize) acquires exclusive ownership of the
///    line and drives it to the given level in one step, so the line never
///    floats at an unknown level between acquisition and first write.
/// 2. [`set_level`](Self::set_level) drives the line while owned.
/// 3. [`release`](Self::release) hands the line back to the platform.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`, which cannot be used in trait objects. For dynamic dispatch
/// use the enum wrapper from the [`devices`](crate::devices) module:
///
/// ```
/// use turngate_hardware::devices::AnyOutputPin;
/// use turngate_hardware::mock::MockPin;
/// use turngate_hardware::traits::DigitalOutputPin;
/// use turngate_core::Level;
///
/// # #[tokio::main]
/// # async fn main() -> turngate_hardware::Result<()> {
/// let (pin, handle) = MockPin::new();
/// let mut pin = AnyOutputPin::Mock(pin);
///
/// pin.initialize(Level::Low).await?;
/// pin.set_level(Level::High).await?;
/// assert_eq!(handle.level(), Some(Level::High));
/// # Ok(())
/// # }
/// ```
pub trait DigitalOutputPin: Send + Sync {
    /// Acquire the line and drive it to `level`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The line does not exist (`PinNotFound`)
    /// - The line is owned by another consumer (`PinBusy`)
    /// - The initial level cannot be written
    async fn initialize(&mut self, level: Level) -> Result<()>;

    /// Drive the line to `level`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin is not initialized or the write fails.
    async fn set_level(&mut self, level: Level) -> Result<()>;

    /// Give the line back to the platform.
    ///
    /// Callers drive the line to its resting level before releasing.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses the release.
    async fn release(&mut self) -> Result<()>;

    /// Get device information.
    fn info(&self) -> DeviceInfo;
}
