//! Mock hardware implementations for testing and development.
//!
//! These implementations simulate hardware behavior without requiring
//! physical devices.

pub mod pin;

pub use pin::{MockPin, MockPinHandle, PinWrite};
