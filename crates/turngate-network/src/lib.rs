//! Network communication layer for Turngate
//!
//! This crate provides the HTTPS client for the turnstile ticketing backend.
//! It handles request construction, authentication and the backend's two
//! error channels (HTTP status and embedded error code).
//!
//! # Components
//!
//! - **CheckInClient**: connectivity check, availability pre-check and
//!   ticket consumption
//!
//! # Example
//!
//! ```no_run
//! use turngate_core::Config;
//! use turngate_network::CheckInClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CheckInClient::from_config(&Config::default())?;
//! let site = client.check_in().await?;
//! println!("Gate {} at {}", site.gate_name, site.site_name);
//! # Ok(())
//! # }
//! ```

mod client;
pub mod error;
pub mod models;

pub use client::{CheckInClient, CheckInClientConfig};
pub use error::{ApiError, Result};
pub use models::{Availability, ConsumeResult, SiteInfo};
