//! Check-in orchestration.
//!
//! [`CheckInService`] turns one scanned string into at most one relay pulse:
//!
//! ```text
//! scan ──► prefix filter ──► [checkAvailable] ──► doConsume ──► pulse
//!              │                    │                 │
//!              └──── rejected ──────┴──── error ──────┴──► no pulse
//! ```
//!
//! Scans are handled one at a time. A scan that arrives while another is in
//! flight waits for it, including its pulse.

use crate::error::{CheckInError, Result};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use turngate_core::{Config, validate_scan};
use turngate_hardware::RelayController;
use turngate_network::CheckInClient;

/// Composes the scan filter, the backend client and the relay.
#[derive(Debug)]
pub struct CheckInService {
    config: Config,
    client: CheckInClient,
    relay: RelayController,
    in_flight: Mutex<()>,
}

impl CheckInService {
    /// Create a service from already-built parts. The relay is not
    /// initialized here.
    pub fn new(config: Config, client: CheckInClient, relay: RelayController) -> Self {
        Self {
            config,
            client,
            relay,
            in_flight: Mutex::new(()),
        }
    }

    /// Build the client and the sysfs relay described by `config`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError`-kind error if the record cannot be turned into
    /// a client or a pin.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let client = CheckInClient::from_config(&config)?;
        let relay = RelayController::sysfs(&config)?;
        Ok(Self::new(config, client, relay))
    }

    /// Acquire the relay pin and drive it to its resting level.
    ///
    /// # Errors
    ///
    /// A `HardwareError` here is fatal: no scan may be accepted.
    pub async fn initialize(&self) -> Result<()> {
        self.relay.initialize().await?;
        Ok(())
    }

    /// Handle one scanned string and return the backend's verbose message.
    ///
    /// The relay fires exactly once if and only if the ticket was consumed.
    pub async fn handle_scan(&self, text: &str) -> Result<String> {
        let _in_flight = self.in_flight.lock().await;

        let ticket = match validate_scan(text) {
            Ok(ticket) => ticket,
            Err(e) => {
                warn!(scan = text, "Scan rejected");
                return Err(e.into());
            }
        };

        if self.config.single_mode {
            debug!(ticket = %ticket, "Single mode, skipping availability check");
        } else {
            let availability = self.client.check_available(&ticket).await.map_err(|e| {
                warn!(ticket = %ticket, error = %e, "Availability check failed");
                CheckInError::from(e)
            })?;
            debug!(ticket = %ticket, serial = %availability.serial_number, "Ticket available");
        }

        let consumed = self.client.consume(&ticket).await.map_err(|e| {
            warn!(ticket = %ticket, error = %e, timed_out = e.is_timeout(), "Consume failed");
            CheckInError::from(e)
        })?;
        if !consumed.result {
            warn!(ticket = %ticket, guid = %consumed.guid, "Backend reported result=false without an error code");
        }

        self.relay.trigger_pulse().await?;
        info!(ticket = %ticket, guid = %consumed.guid, "Ticket consumed, gate opened");

        Ok(consumed.verbose_result)
    }

    /// Connectivity check. Returns the name of the site this gate belongs to.
    pub async fn probe(&self) -> Result<String> {
        let site = self.client.check_in().await?;
        info!(site = %site.site_name, gate = %site.gate_name, "Backend reachable");
        Ok(site.site_name)
    }

    /// Fire the relay once without a ticket.
    pub async fn test_pulse(&self) -> Result<()> {
        let _in_flight = self.in_flight.lock().await;
        info!("Test pulse requested");
        self.relay.trigger_pulse().await?;
        Ok(())
    }

    /// Release the relay pin. Safe to call more than once.
    pub async fn shutdown(&self) -> Result<()> {
        let _in_flight = self.in_flight.lock().await;
        self.relay.release().await?;
        Ok(())
    }

    /// The configuration this service was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The relay controller.
    pub fn relay(&self) -> &RelayController {
        &self.relay
    }
}
