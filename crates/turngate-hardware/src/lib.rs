//! Hardware abstraction layer for the Turngate turnstile controller.
//!
//! This crate provides the trait-based abstraction for the one peripheral a
//! turnstile needs, a digital output line wired to the latch relay, together
//! with the [`RelayController`] state machine that drives it through timed,
//! polarity-aware pulses.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations are asynchronous using native `async fn`
//!   in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Enum dispatch**: Backends are selected through [`AnyOutputPin`] rather than
//!   trait objects, since RPITIT traits are not object-safe.
//! - **Thread-safe**: All traits require `Send + Sync` for use with Tokio.
//! - **Error-aware**: All operations return `Result<T>` with detailed error information.
//!
//! # Output Pins
//!
//! The [`DigitalOutputPin`] trait is implemented by:
//!
//! - [`MockPin`](mock::MockPin): in-memory pin with a write log, for tests and
//!   development without hardware.
//! - [`SysfsPin`](sysfs::SysfsPin): a Linux GPIO line driven through
//!   `/sys/class/gpio`.
//!
//! ```no_run
//! use turngate_core::Level;
//! use turngate_hardware::traits::DigitalOutputPin;
//! use turngate_hardware::error::Result;
//!
//! async fn blink<P: DigitalOutputPin>(pin: &mut P) -> Result<()> {
//!     pin.initialize(Level::Low).await?;
//!     pin.set_level(Level::High).await?;
//!     pin.set_level(Level::Low).await?;
//!     pin.release().await
//! }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] which uses the
//! [`HardwareError`] error type.
//!
//! [`DigitalOutputPin`]: traits::DigitalOutputPin

pub mod devices;
pub mod error;
pub mod mock;
pub mod relay;
pub mod sysfs;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::AnyOutputPin;
pub use error::{HardwareError, Result};
pub use relay::{RelayController, RelayState};
pub use traits::DigitalOutputPin;
pub use types::DeviceInfo;
