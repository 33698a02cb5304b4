//! Persisted configuration record.
//!
//! The configuration is a flat YAML document loaded once at startup and
//! replaced as a whole when an operator changes a setting:
//!
//! ```yaml
//! demo_mode: true
//! single_mode: false
//! direction_out: false
//! relay_pin: 17
//! high_mode: false
//! signal_duration_ms: 200
//! request_timeout_ms: 5000
//! ```
//!
//! `api_key` is omitted while unset. A missing file is not an error on first
//! run: [`Config::load_or_init`] writes the defaults and returns them.
//!
//! # Examples
//!
//! ```no_run
//! use turngate_core::Config;
//!
//! # fn example() -> turngate_core::Result<()> {
//! let mut config = Config::load_or_init("config.yaml")?;
//! config.direction_out = true;
//! config.store("config.yaml")?;
//! # Ok(())
//! # }
//! ```

use crate::constants::{
    DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SIGNAL_DURATION_MS, DEMO_API_BASE_URL,
    MAX_SIGNAL_DURATION_MS, PRODUCTION_API_BASE_URL,
};
use crate::{AccessDirection, Error, PinId, Polarity, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Check-in station configuration.
///
/// Owned by the check-in service for the whole session; the HTTP client and
/// the relay controller read it once when they are constructed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Talk to the non-production backend.
    pub demo_mode: bool,

    /// Skip the availability pre-check and consume directly.
    pub single_mode: bool,

    /// This gate lets people out rather than in.
    pub direction_out: bool,

    /// Credential sent verbatim in the `Authorization` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// GPIO line driving the relay.
    pub relay_pin: PinId,

    /// The relay line rests High and pulses Low.
    pub high_mode: bool,

    /// How long each pulse holds the active level.
    #[serde(default = "default_signal_duration_ms")]
    pub signal_duration_ms: u64,

    /// Transport timeout for each backend call.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_signal_duration_ms() -> u64 {
    DEFAULT_SIGNAL_DURATION_MS
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo_mode: true,
            single_mode: false,
            direction_out: false,
            api_key: None,
            relay_pin: PinId::default(),
            high_mode: false,
            signal_duration_ms: DEFAULT_SIGNAL_DURATION_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("demo_mode", &self.demo_mode)
            .field("single_mode", &self.single_mode)
            .field("direction_out", &self.direction_out)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("relay_pin", &self.relay_pin)
            .field("high_mode", &self.high_mode)
            .field("signal_duration_ms", &self.signal_duration_ms)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

impl Config {
    /// Load the configuration file, creating it with defaults if missing.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, is not valid
    /// YAML for this record, or fails [`validate`](Self::validate). Writing
    /// the default file on first run can also fail with `Error::Io`.
    pub fn load_or_init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No configuration found, writing defaults");
                let config = Config::default();
                config.store(path)?;
                return Ok(config);
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        debug!(path = %path.display(), ?config, "Configuration loaded");
        Ok(config)
    }

    /// Persist this record, replacing whatever the file held before.
    ///
    /// The record is written to a sibling temporary file first and renamed
    /// into place, so a crash never leaves a half-written configuration.
    ///
    /// # Errors
    /// Returns an error if the record is invalid or the file cannot be written.
    pub fn store(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.validate()?;

        let yaml = serde_yaml::to_string(self)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");

        std::fs::write(&tmp, yaml)?;
        std::fs::rename(&tmp, path)?;

        debug!(path = %path.display(), "Configuration stored");
        Ok(())
    }

    /// Check the record for values the rest of the system cannot work with.
    ///
    /// # Errors
    /// Returns `Error::Config` describing the first invalid field, or
    /// `Error::InvalidPin` if the relay pin cannot be resolved to a line.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SIGNAL_DURATION_MS).contains(&self.signal_duration_ms) {
            return Err(Error::config(format!(
                "signal_duration_ms must be 1-{MAX_SIGNAL_DURATION_MS}, got {}",
                self.signal_duration_ms
            )));
        }

        if self.request_timeout_ms == 0 {
            return Err(Error::config("request_timeout_ms must be greater than 0"));
        }

        if let Some(key) = &self.api_key {
            if key.trim().is_empty() {
                return Err(Error::config("api_key must not be blank"));
            }
            // Must survive being sent as an HTTP header value
            if key.bytes().any(|b| b.is_ascii_control()) {
                return Err(Error::config("api_key contains control characters"));
            }
        }

        self.relay_pin.line()?;
        Ok(())
    }

    /// Base URL for the turnstile API, selected by demo mode.
    #[must_use]
    pub fn api_base_url(&self) -> &'static str {
        if self.demo_mode {
            DEMO_API_BASE_URL
        } else {
            PRODUCTION_API_BASE_URL
        }
    }

    /// Direction reported to the backend.
    #[must_use]
    pub fn access_direction(&self) -> AccessDirection {
        AccessDirection::from_direction_out(self.direction_out)
    }

    /// Relay polarity derived from `high_mode`.
    #[must_use]
    pub fn polarity(&self) -> Polarity {
        Polarity::from_high_mode(self.high_mode)
    }

    /// Length of one relay pulse.
    #[must_use]
    pub fn pulse_duration(&self) -> Duration {
        Duration::from_millis(self.signal_duration_ms)
    }

    /// Transport timeout for backend calls.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.demo_mode);
        assert!(!config.single_mode);
        assert!(!config.direction_out);
        assert_eq!(config.api_key, None);
        assert_eq!(config.relay_pin, PinId::Number(17));
        assert!(!config.high_mode);
        assert_eq!(config.signal_duration_ms, 200);
        assert_eq!(config.request_timeout_ms, 5000);
        config.validate().unwrap();
    }

    #[test]
    fn test_load_or_init_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");

        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let reloaded = Config::load_or_init(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_store_and_reload_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");

        let config = Config {
            demo_mode: false,
            single_mode: true,
            direction_out: true,
            api_key: Some("secret-key".to_string()),
            relay_pin: PinId::Name("P1_11".to_string()),
            high_mode: true,
            signal_duration_ms: 750,
            request_timeout_ms: 2500,
        };
        config.store(&path).unwrap();

        let reloaded = Config::load_or_init(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_store_replaces_whole_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");

        let first = Config {
            api_key: Some("old".to_string()),
            ..Config::default()
        };
        first.store(&path).unwrap();

        let second = Config::default();
        second.store(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("api_key"));
        assert_eq!(Config::load_or_init(&path).unwrap(), second);
    }

    #[test]
    fn test_load_legacy_file_without_durations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "demo_mode: false\nsingle_mode: false\ndirection_out: true\nrelay_pin: 27\nhigh_mode: true\n",
        )
        .unwrap();

        let config = Config::load_or_init(&path).unwrap();
        assert!(!config.demo_mode);
        assert!(config.direction_out);
        assert_eq!(config.relay_pin, PinId::Number(27));
        assert_eq!(config.signal_duration_ms, DEFAULT_SIGNAL_DURATION_MS);
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "demo_mode: [not, a, bool]\n").unwrap();

        let result = Config::load_or_init(&path);
        assert!(matches!(result, Err(Error::Yaml(_))));
    }

    #[rstest]
    #[case(0)]
    #[case(MAX_SIGNAL_DURATION_MS + 1)]
    fn test_validate_rejects_signal_duration(#[case] duration: u64) {
        let config = Config {
            signal_duration_ms: duration,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("key\nwith-newline")]
    fn test_validate_rejects_api_key(#[case] key: &str) {
        let config = Config {
            api_key: Some(key.to_string()),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_validate_rejects_unknown_pin_name() {
        let config = Config {
            relay_pin: PinId::Name("relay".to_string()),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidPin(_))));
    }

    #[test]
    fn test_derived_accessors() {
        let mut config = Config::default();
        assert_eq!(config.api_base_url(), DEMO_API_BASE_URL);
        assert_eq!(config.access_direction(), AccessDirection::Inbound);
        assert_eq!(config.polarity(), Polarity::RestLow);
        assert_eq!(config.pulse_duration(), Duration::from_millis(200));

        config.demo_mode = false;
        config.direction_out = true;
        config.high_mode = true;
        assert_eq!(config.api_base_url(), PRODUCTION_API_BASE_URL);
        assert_eq!(config.access_direction(), AccessDirection::Outbound);
        assert_eq!(config.polarity(), Polarity::RestHigh);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config {
            api_key: Some("super-secret".to_string()),
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
