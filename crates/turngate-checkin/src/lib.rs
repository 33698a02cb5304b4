//! Check-in orchestration for the Turngate turnstile controller.
//!
//! This crate ties the prefix filter from `turngate-core`, the backend client
//! from `turngate-network` and the relay controller from `turngate-hardware`
//! into the single operation the scanner front end calls:
//! [`CheckInService::handle_scan`].
//!
//! # Example
//!
//! ```no_run
//! use turngate_checkin::CheckInService;
//! use turngate_core::Config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_init("config.yaml")?;
//! let service = CheckInService::from_config(config)?;
//! service.initialize().await?;
//!
//! match service.handle_scan("SU_ABC123").await {
//!     Ok(message) => println!("{message}"),
//!     Err(e) => println!("{} ({})", e, e.kind()),
//! }
//!
//! service.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod service;

pub use error::{CheckInError, ErrorKind, Result};
pub use service::CheckInService;
