//! Core types for the Turngate check-in system.
//!
//! This crate holds everything the other crates agree on: the persisted
//! [`Config`] record, the domain types that flow between the check-in client
//! and the relay controller, and the prefix filter that decides whether a
//! scanned string is worth sending to the backend at all.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
pub mod validator;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
pub use validator::{is_admissible, validate_scan};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
