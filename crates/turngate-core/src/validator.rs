//! Scan admissibility filter.
//!
//! A scan is admissible iff it starts with one of
//! [`PERMITTED_PREFIXES`](crate::constants::PERMITTED_PREFIXES). The check is
//! pure and case-sensitive, and it never trims: a scan with leading
//! whitespace is rejected, so nothing reaches the network or the relay unless
//! it looks like a backend-issued code.
//!
//! # Examples
//!
//! ```
//! use turngate_core::{is_admissible, validate_scan};
//!
//! assert!(is_admissible("SU_ABC123"));
//! assert!(!is_admissible("su_abc123"));
//!
//! let err = validate_scan("GC_42").unwrap_err();
//! assert_eq!(err.to_string(), "GC_42 is not permitted");
//! ```

use crate::constants::PERMITTED_PREFIXES;
use crate::{Result, TicketCode};

/// Returns `true` if `text` starts with a permitted ticket prefix.
#[must_use]
pub fn is_admissible(text: &str) -> bool {
    PERMITTED_PREFIXES
        .iter()
        .any(|prefix| text.starts_with(prefix))
}

/// Classify a raw scan, turning it into a [`TicketCode`] when admissible.
///
/// # Errors
/// Returns `Error::Rejected` with the literal scan text otherwise.
pub fn validate_scan(text: &str) -> Result<TicketCode> {
    TicketCode::parse(text)
}
