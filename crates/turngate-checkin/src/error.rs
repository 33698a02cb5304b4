//! Check-in error taxonomy.

use std::fmt;
use thiserror::Error;
use turngate_hardware::HardwareError;
use turngate_network::ApiError;

/// Result type alias for check-in operations.
pub type Result<T> = std::result::Result<T, CheckInError>;

/// Errors produced while handling a scan.
#[derive(Debug, Error)]
pub enum CheckInError {
    /// The scan does not start with a permitted prefix.
    #[error("{0} is not permitted")]
    Rejected(String),

    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The relay could not be driven.
    #[error("Relay error: {0}")]
    Hardware(#[from] HardwareError),

    /// The configuration record is unusable.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<turngate_core::Error> for CheckInError {
    fn from(error: turngate_core::Error) -> Self {
        match error {
            turngate_core::Error::Rejected(text) => Self::Rejected(text),
            other => Self::Config(other.to_string()),
        }
    }
}

/// Classification of a [`CheckInError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationRejected,
    NetworkError,
    AuthError,
    BusinessError,
    DecodeError,
    HardwareError,
    ConfigError,
}

impl ErrorKind {
    /// Returns `true` for errors that must stop startup before any scan is
    /// accepted.
    pub fn is_fatal_at_startup(self) -> bool {
        matches!(self, Self::HardwareError | Self::ConfigError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ValidationRejected => "validation rejected",
            Self::NetworkError => "network error",
            Self::AuthError => "authentication error",
            Self::BusinessError => "business error",
            Self::DecodeError => "decode error",
            Self::HardwareError => "hardware error",
            Self::ConfigError => "configuration error",
        };
        f.write_str(name)
    }
}

impl CheckInError {
    /// The taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Rejected(_) => ErrorKind::ValidationRejected,
            Self::Api(ApiError::Network(_)) => ErrorKind::NetworkError,
            Self::Api(ApiError::Unauthorized) => ErrorKind::AuthError,
            Self::Api(ApiError::Business { .. }) => ErrorKind::BusinessError,
            Self::Api(ApiError::Decode { .. }) => ErrorKind::DecodeError,
            Self::Api(ApiError::Configuration(_)) => ErrorKind::ConfigError,
            Self::Hardware(HardwareError::ConfigurationError { .. }) => ErrorKind::ConfigError,
            Self::Hardware(_) => ErrorKind::HardwareError,
            Self::Config(_) => ErrorKind::ConfigError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_rejection_message_embeds_scan() {
        let error = CheckInError::from(turngate_core::Error::Rejected("XX_1".to_string()));
        assert_eq!(error.kind(), ErrorKind::ValidationRejected);
        assert_eq!(error.to_string(), "XX_1 is not permitted");
    }

    #[test]
    fn test_business_error_shows_backend_message() {
        let error = CheckInError::from(ApiError::business("Ticket already used"));
        assert_eq!(error.kind(), ErrorKind::BusinessError);
        assert_eq!(error.to_string(), "Ticket already used");
    }

    #[rstest]
    #[case(CheckInError::Api(ApiError::Unauthorized), ErrorKind::AuthError)]
    #[case(CheckInError::Api(ApiError::decode("eof", "")), ErrorKind::DecodeError)]
    #[case(CheckInError::Api(ApiError::Configuration("bad key".into())), ErrorKind::ConfigError)]
    #[case(CheckInError::Hardware(HardwareError::NotInitialized), ErrorKind::HardwareError)]
    #[case(CheckInError::Hardware(HardwareError::pin_busy("gpio17")), ErrorKind::HardwareError)]
    #[case(CheckInError::Hardware(HardwareError::configuration("relay")), ErrorKind::ConfigError)]
    #[case(CheckInError::Config("missing".into()), ErrorKind::ConfigError)]
    fn test_error_kind(#[case] error: CheckInError, #[case] expected: ErrorKind) {
        assert_eq!(error.kind(), expected);
    }

    #[test]
    fn test_fatal_kinds() {
        assert!(ErrorKind::HardwareError.is_fatal_at_startup());
        assert!(ErrorKind::ConfigError.is_fatal_at_startup());
        assert!(!ErrorKind::NetworkError.is_fatal_at_startup());
        assert!(!ErrorKind::ValidationRejected.is_fatal_at_startup());
    }
}
