//! Relay controller.
//!
//! Owns the one output pin wired to the turnstile latch and runs the
//! `Idle → Resting → Pulsing → Resting → Idle` state machine over it.
//!
//! # Pulse Serialization
//!
//! ```text
//!  trigger_pulse ──► lock_owned() ──► spawn ┌────────────────────────────┐
//!  trigger_pulse ──► (queued)               │ set active                 │
//!                                           │ sleep(pulse_duration)      │
//!                                           │ set resting  (always)      │
//!                                           └────────────────────────────┘
//! ```
//!
//! The pin lives behind a `tokio::sync::Mutex`. A trigger takes the owned
//! guard and moves it into a spawned task that runs the whole pulse, so a
//! second trigger waits for the first to restore the resting level, and a
//! caller that stops waiting cannot leave the latch open.

use crate::devices::AnyOutputPin;
use crate::traits::DigitalOutputPin;
use crate::{HardwareError, Result};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info};
use turngate_core::{Config, Level, PinId, Polarity};

/// State of the relay pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Pin not acquired.
    Idle,
    /// Pin held at the resting level.
    Resting,
    /// Pin held at the active level while the pulse timer runs.
    Pulsing,
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayState::Idle => write!(f, "idle"),
            RelayState::Resting => write!(f, "resting"),
            RelayState::Pulsing => write!(f, "pulsing"),
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: watch::Sender<RelayState>,
    faulted: AtomicBool,
}

impl Shared {
    fn set_state(&self, state: RelayState) {
        self.state.send_replace(state);
    }

    fn current(&self) -> RelayState {
        *self.state.borrow()
    }
}

/// Drives the relay pin through polarity-aware timed pulses.
///
/// # Examples
///
/// ```
/// use turngate_core::{Config, Level};
/// use turngate_hardware::mock::MockPin;
/// use turngate_hardware::relay::RelayController;
///
/// # #[tokio::main]
/// # async fn main() -> turngate_hardware::Result<()> {
/// let config = Config {
///     signal_duration_ms: 10,
///     ..Config::default()
/// };
/// let (pin, handle) = MockPin::new();
/// let relay = RelayController::new(pin, &config);
///
/// relay.initialize().await?;
/// relay.trigger_pulse().await?;
/// relay.release().await?;
///
/// // Release drives the resting level once more before letting go
/// assert_eq!(
///     handle.levels(),
///     vec![Level::Low, Level::High, Level::Low, Level::Low]
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RelayController {
    pin: Arc<Mutex<AnyOutputPin>>,
    shared: Arc<Shared>,
    pin_id: PinId,
    polarity: Polarity,
    pulse_duration: Duration,
}

impl RelayController {
    /// Create a controller for `pin` using the polarity, pulse duration and
    /// pin identifier from `config`. The pin is not touched until
    /// [`initialize`](Self::initialize).
    pub fn new(pin: impl Into<AnyOutputPin>, config: &Config) -> Self {
        let (state, _) = watch::channel(RelayState::Idle);
        Self {
            pin: Arc::new(Mutex::new(pin.into())),
            shared: Arc::new(Shared {
                state,
                faulted: AtomicBool::new(false),
            }),
            pin_id: config.relay_pin.clone(),
            polarity: config.polarity(),
            pulse_duration: config.pulse_duration(),
        }
    }

    /// Create a controller for the configured sysfs GPIO line.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if `relay_pin` does not name a GPIO line.
    pub fn sysfs(config: &Config) -> Result<Self> {
        let pin = AnyOutputPin::sysfs(&config.relay_pin)?;
        Ok(Self::new(pin, config))
    }

    /// Acquire the pin and drive it to the resting level (`Idle → Resting`).
    ///
    /// # Errors
    ///
    /// Returns `AlreadyInitialized` if the controller is not idle, or the
    /// pin's acquisition error (`PinNotFound`, `PinBusy`, ...).
    pub async fn initialize(&self) -> Result<()> {
        let mut pin = self.pin.lock().await;
        if self.shared.current() != RelayState::Idle {
            return Err(HardwareError::AlreadyInitialized);
        }

        let resting = self.polarity.resting();
        if let Err(e) = pin.initialize(resting).await {
            if e.is_acquisition_failure() {
                error!(pin = %self.pin_id, error = %e, "Relay line could not be acquired");
            }
            return Err(e);
        }
        self.shared.set_state(RelayState::Resting);

        info!(
            pin = %self.pin_id,
            device = %pin.info(),
            resting = %resting,
            pulse_ms = self.pulse_duration.as_millis() as u64,
            "Relay initialized"
        );
        Ok(())
    }

    /// Fire one pulse: drive the active level, hold it for the configured
    /// duration, then restore the resting level.
    ///
    /// A trigger issued while another pulse is running waits for it to
    /// finish. Failed level-sets are logged and reported through
    /// [`is_faulted`](Self::is_faulted); the call itself still completes.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` if the relay is idle.
    pub async fn trigger_pulse(&self) -> Result<()> {
        let mut pin = Arc::clone(&self.pin).lock_owned().await;
        if self.shared.current() != RelayState::Resting {
            return Err(HardwareError::NotInitialized);
        }

        let shared = Arc::clone(&self.shared);
        let active = self.polarity.active();
        let resting = self.polarity.resting();
        let duration = self.pulse_duration;
        let pin_id = self.pin_id.clone();

        let pulse = tokio::spawn(async move {
            shared.set_state(RelayState::Pulsing);
            let mut faulted = false;

            debug!(pin = %pin_id, level = %active, "Relay pin set");
            match pin.set_level(active).await {
                Ok(()) => tokio::time::sleep(duration).await,
                Err(e) => {
                    error!(pin = %pin_id, level = %active, error = %e, "Failed to drive relay to active level");
                    faulted = true;
                }
            }

            debug!(pin = %pin_id, level = %resting, "Relay pin set");
            if let Err(e) = pin.set_level(resting).await {
                error!(
                    pin = %pin_id,
                    level = %resting,
                    error = %e,
                    "Failed to restore relay resting level, operator intervention required"
                );
                faulted = true;
            }

            shared.faulted.store(faulted, Ordering::SeqCst);
            shared.set_state(RelayState::Resting);
            info!(pin = %pin_id, duration_ms = duration.as_millis() as u64, faulted, "Relay pulsed");
        });

        pulse
            .await
            .map_err(|e| HardwareError::other(format!("Pulse task failed: {e}")))
    }

    /// Drive the resting level one final time and hand the pin back
    /// (`Resting → Idle`). Does nothing if the relay is idle.
    ///
    /// # Errors
    ///
    /// Returns the pin's error if it refuses the release. The controller is
    /// idle afterwards either way.
    pub async fn release(&self) -> Result<()> {
        let mut pin = self.pin.lock().await;
        if self.shared.current() == RelayState::Idle {
            return Ok(());
        }

        let resting = self.polarity.resting();
        if let Err(e) = pin.set_level(resting).await {
            error!(pin = %self.pin_id, level = %resting, error = %e, "Failed to restore relay resting level before release");
        }

        let result = pin.release().await;
        self.shared.set_state(RelayState::Idle);
        info!(pin = %self.pin_id, "Relay released");
        result
    }

    /// Current relay state.
    pub fn state(&self) -> RelayState {
        self.shared.current()
    }

    /// Subscribe to relay state changes.
    pub fn subscribe(&self) -> watch::Receiver<RelayState> {
        self.shared.state.subscribe()
    }

    /// Returns `true` if the most recent pulse failed to set a level, leaving
    /// the latch in an unknown electrical state.
    pub fn is_faulted(&self) -> bool {
        self.shared.faulted.load(Ordering::SeqCst)
    }

    /// Configured polarity.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Configured pulse length.
    pub fn pulse_duration(&self) -> Duration {
        self.pulse_duration
    }

    /// Configured pin identifier.
    pub fn pin_id(&self) -> &PinId {
        &self.pin_id
    }

    /// Level the pin rests at between pulses.
    pub fn resting_level(&self) -> Level {
        self.polarity.resting()
    }
}
