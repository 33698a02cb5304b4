//! Constants shared across the check-in pipeline.
//!
//! # Usage
//!
//! ```
//! use turngate_core::constants::*;
//!
//! assert!(PERMITTED_PREFIXES.contains(&"SU_"));
//! assert!(DEMO_API_BASE_URL.ends_with("/v2/turnstiles/"));
//! ```

// ============================================================================
// Ticket Codes
// ============================================================================

/// Prefixes a scanned string must start with to be sent to the backend.
///
/// Matching is case-sensitive and performed on the raw scan, without trimming.
pub const PERMITTED_PREFIXES: [&str; 6] = ["PA_", "SU_", "CL_", "SE_", "SL_", "EV_"];

/// Separator between a ticket code and its access-direction suffix (`SU_ABC:1`).
pub const DIRECTION_SEPARATOR: char = ':';

// ============================================================================
// Backend
// ============================================================================

/// Turnstile API base used when demo mode is on.
pub const DEMO_API_BASE_URL: &str = "https://beta-backend-dev-kpe3ohblca-ew.a.run.app/v2/turnstiles/";

/// Turnstile API base used in production.
pub const PRODUCTION_API_BASE_URL: &str = "https://api.sendmoregetbeta.com/v2/turnstiles/";

/// Connectivity check endpoint (GET).
pub const ENDPOINT_CHECK_IN: &str = "checkIn";

/// Availability pre-check endpoint (POST).
pub const ENDPOINT_CHECK_AVAILABLE: &str = "checkAvailable";

/// Consumption endpoint (POST).
pub const ENDPOINT_DO_CONSUME: &str = "doConsume";

// ============================================================================
// Configuration Defaults
// ============================================================================

/// Configuration file name used when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// GPIO line driving the relay on a fresh install (BCM 17, header pin 11).
pub const DEFAULT_RELAY_PIN: u32 = 17;

/// Default relay pulse length in milliseconds.
pub const DEFAULT_SIGNAL_DURATION_MS: u64 = 200;

/// Upper bound accepted for the relay pulse length.
///
/// A gate held open for longer than this is a configuration mistake.
pub const MAX_SIGNAL_DURATION_MS: u64 = 10_000;

/// Default transport timeout for backend calls in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
