//! Mock output pin implementation for testing and development.
//!
//! This module provides a simulated GPIO line that records every level it is
//! driven to, so tests can assert on the exact sequence and timing of relay
//! writes without physical hardware.

use crate::{HardwareError, Result, traits::DigitalOutputPin, types::DeviceInfo};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;
use turngate_core::Level;

/// One successful level write recorded by a [`MockPin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinWrite {
    /// Level the pin was driven to.
    pub level: Level,

    /// When the write happened (Tokio clock, so paused-time tests are exact).
    pub at: Instant,
}

#[derive(Debug, Default)]
struct MockPinState {
    acquired: bool,
    level: Option<Level>,
    writes: Vec<PinWrite>,
    releases: usize,
    fail_acquisition: bool,
    failing_writes: usize,
}

/// Mock output pin for testing and development.
///
/// The pin shares its state with a [`MockPinHandle`], which tests use to
/// inspect the write log and to inject failures.
///
/// # Examples
///
/// ```
/// use turngate_hardware::mock::MockPin;
/// use turngate_hardware::traits::DigitalOutputPin;
/// use turngate_core::Level;
///
/// #[tokio::main]
/// async fn main() -> turngate_hardware::Result<()> {
///     let (mut pin, handle) = MockPin::new();
///
///     pin.initialize(Level::Low).await?;
///     pin.set_level(Level::High).await?;
///     pin.set_level(Level::Low).await?;
///
///     assert_eq!(handle.levels(), vec![Level::Low, Level::High, Level::Low]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockPin {
    state: Arc<Mutex<MockPinState>>,

    /// Device name
    name: String,
}

impl MockPin {
    /// Create a new mock pin with the default name.
    ///
    /// Returns a tuple of (MockPin, MockPinHandle) where the handle can be
    /// used to observe and manipulate the pin.
    pub fn new() -> (Self, MockPinHandle) {
        Self::with_name("Mock Pin".to_string())
    }

    /// Create a new mock pin with a custom name.
    pub fn with_name(name: String) -> (Self, MockPinHandle) {
        let state = Arc::new(Mutex::new(MockPinState::default()));

        let pin = Self {
            state: Arc::clone(&state),
            name,
        };

        (pin, MockPinHandle { state })
    }

    fn state(&self) -> MutexGuard<'_, MockPinState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockPin {
    fn default() -> Self {
        Self::new().0
    }
}

impl DigitalOutputPin for MockPin {
    async fn initialize(&mut self, level: Level) -> Result<()> {
        let mut state = self.state();

        if state.fail_acquisition {
            return Err(HardwareError::pin_not_found(&self.name));
        }
        if state.acquired {
            return Err(HardwareError::pin_busy(&self.name));
        }

        state.acquired = true;
        state.level = Some(level);
        state.writes.push(PinWrite {
            level,
            at: Instant::now(),
        });
        Ok(())
    }

    async fn set_level(&mut self, level: Level) -> Result<()> {
        let mut state = self.state();

        if !state.acquired {
            return Err(HardwareError::NotInitialized);
        }
        if state.failing_writes > 0 {
            state.failing_writes -= 1;
            return Err(HardwareError::write(level, "injected failure"));
        }

        state.level = Some(level);
        state.writes.push(PinWrite {
            level,
            at: Instant::now(),
        });
        Ok(())
    }

    async fn release(&mut self) -> Result<()> {
        let mut state = self.state();

        if !state.acquired {
            return Err(HardwareError::NotInitialized);
        }

        state.acquired = false;
        state.releases += 1;
        Ok(())
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), "mock")
    }
}

/// Handle for observing and controlling a mock pin.
///
/// This handle can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct MockPinHandle {
    state: Arc<Mutex<MockPinState>>,
}

impl MockPinHandle {
    fn state(&self) -> MutexGuard<'_, MockPinState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Level the pin was last driven to, `None` before initialization.
    pub fn level(&self) -> Option<Level> {
        self.state().level
    }

    /// Returns `true` while the pin is owned.
    pub fn is_acquired(&self) -> bool {
        self.state().acquired
    }

    /// Every successful write, including the initial level.
    pub fn writes(&self) -> Vec<PinWrite> {
        self.state().writes.clone()
    }

    /// Levels of every successful write, in order.
    pub fn levels(&self) -> Vec<Level> {
        self.state().writes.iter().map(|w| w.level).collect()
    }

    /// Number of writes that drove the pin to `level`.
    pub fn count_level(&self, level: Level) -> usize {
        self.state()
            .writes
            .iter()
            .filter(|w| w.level == level)
            .count()
    }

    /// Number of times the pin was released.
    pub fn release_count(&self) -> usize {
        self.state().releases
    }

    /// Make the next `initialize` fail as if the line did not exist.
    pub fn fail_acquisition(&self) {
        self.state().fail_acquisition = true;
    }

    /// Make the next `count` calls to `set_level` fail.
    pub fn fail_next_writes(&self, count: usize) {
        self.state().failing_writes = count;
    }
}
